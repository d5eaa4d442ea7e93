//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod extract;
pub mod lines;
pub mod rename;

use std::path::{Path, PathBuf};

use tracing::debug;

use fapiao_core::models::config::FapiaoConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fapiao")
        .join("config.json")
}

/// The configuration file in effect: the `--config` flag, else the default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit path must exist; the default path falls back to defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<FapiaoConfig> {
    if let Some(path) = explicit {
        return Ok(FapiaoConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(FapiaoConfig::from_file(&path)?)
    } else {
        Ok(FapiaoConfig::default())
    }
}

/// Whether a path has a `.pdf` extension, in any case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
