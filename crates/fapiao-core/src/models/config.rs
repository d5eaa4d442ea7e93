//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FapiaoError, Result};
use crate::layout::DEFAULT_TOLERANCE;

/// Main configuration for the fapiao pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FapiaoConfig {
    /// Line reconstruction configuration.
    pub layout: LayoutConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF reading configuration.
    pub pdf: PdfConfig,

    /// Output file naming configuration.
    pub naming: NamingConfig,
}

/// Tolerances used when rebuilding lines from positioned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Largest horizontal gap between fragments that still merge.
    pub x_tolerance: f64,

    /// Vertical bucket size for grouping fragments into lines.
    pub y_tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_tolerance: DEFAULT_TOLERANCE,
            y_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Year used to tell codes from dates. Absent means the current year.
    pub reference_year: Option<i32>,

    /// Fail instead of leaving the amount empty when none is found.
    pub require_amount: bool,
}

/// PDF reading configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Password for encrypted PDFs (empty opens most restricted files).
    pub password: String,
}

/// Output file naming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Name of the person claiming the reimbursement.
    pub claimant: Option<String>,

    /// Separator between filename segments.
    pub separator: String,

    /// Name of the file listing all generated names.
    pub details_file: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            claimant: None,
            separator: "+".to_string(),
            details_file: "发票详情.txt".to_string(),
        }
    }
}

impl FapiaoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject tolerances the line merger cannot work with.
    pub fn validate(&self) -> Result<()> {
        let (x_tolerance, y_tolerance) = (self.layout.x_tolerance, self.layout.y_tolerance);

        if !x_tolerance.is_finite() || x_tolerance < 0.0 {
            return Err(FapiaoError::Config(format!(
                "layout.x_tolerance must be a finite non-negative number, got {}",
                x_tolerance
            )));
        }
        if !y_tolerance.is_finite() || y_tolerance <= 0.0 {
            return Err(FapiaoError::Config(format!(
                "layout.y_tolerance must be a finite positive number, got {}",
                y_tolerance
            )));
        }
        Ok(())
    }
}
