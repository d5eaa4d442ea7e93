//! Tolerance-based line bucketing and horizontal merging.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use super::{LineGroup, PositionedToken, TextBlock};
use crate::models::config::LayoutConfig;

/// Default horizontal gap and vertical jitter tolerance, in page units.
pub const DEFAULT_TOLERANCE: f64 = 10.0;

/// Groups positioned tokens into ordered lines of merged text blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMerger {
    /// Largest gap between a block and the next token that still merges.
    x_tolerance: f64,
    /// Bucket size used to quantize `y`.
    y_tolerance: f64,
}

impl LineMerger {
    /// Create a merger with the given tolerances.
    pub fn new(x_tolerance: f64, y_tolerance: f64) -> Self {
        Self::default()
            .with_x_tolerance(x_tolerance)
            .with_y_tolerance(y_tolerance)
    }

    /// Create a merger from layout settings.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.x_tolerance, config.y_tolerance)
    }

    /// Set the horizontal merge tolerance.
    pub fn with_x_tolerance(mut self, tolerance: f64) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    /// Set the vertical bucket size. Must be positive and finite.
    pub fn with_y_tolerance(mut self, tolerance: f64) -> Self {
        if tolerance.is_finite() && tolerance > 0.0 {
            self.y_tolerance = tolerance;
        } else {
            warn!(
                "Ignoring y tolerance {}, keeping {}",
                tolerance, self.y_tolerance
            );
        }
        self
    }

    pub fn x_tolerance(&self) -> f64 {
        self.x_tolerance
    }

    pub fn y_tolerance(&self) -> f64 {
        self.y_tolerance
    }

    /// Quantize `y` to the nearest multiple of the y tolerance.
    ///
    /// Halves round toward positive infinity. Returns `None` for NaN.
    fn bucket(&self, y: f64) -> Option<i64> {
        let index = (y / self.y_tolerance + 0.5).floor();
        if index.is_nan() {
            None
        } else {
            Some(index as i64)
        }
    }

    /// Build line groups ordered top of page first.
    pub fn group(&self, tokens: &[PositionedToken]) -> Vec<LineGroup> {
        let mut buckets: BTreeMap<i64, Vec<&PositionedToken>> = BTreeMap::new();
        let mut unplaced: Vec<&PositionedToken> = Vec::new();

        for token in tokens {
            match self.bucket(token.y) {
                Some(index) => buckets.entry(index).or_default().push(token),
                None => unplaced.push(token),
            }
        }

        let mut lines: Vec<LineGroup> = buckets
            .into_iter()
            .rev()
            .map(|(index, members)| LineGroup {
                y: index as f64 * self.y_tolerance,
                blocks: self.merge_line(members),
            })
            .collect();

        if !unplaced.is_empty() {
            warn!("{} tokens have no usable y position", unplaced.len());
            lines.push(LineGroup {
                y: f64::NAN,
                blocks: self.merge_line(unplaced),
            });
        }

        trace!("Grouped {} tokens into {} lines", tokens.len(), lines.len());
        lines
    }

    /// Merge the tokens of one line into contiguous blocks.
    fn merge_line(&self, mut members: Vec<&PositionedToken>) -> Vec<TextBlock> {
        // Stable, so equal x keeps input order.
        members.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut blocks = Vec::new();
        let mut current: Option<TextBlock> = None;

        for token in members {
            match current.as_mut() {
                Some(block) if block.gap_to(token) <= self.x_tolerance => block.absorb(token),
                _ => {
                    if let Some(done) = current.replace(TextBlock::start(token)) {
                        blocks.push(done);
                    }
                }
            }
        }

        if let Some(done) = current {
            blocks.push(done);
        }
        blocks
    }

    /// Reconstruct the ordered text sequence: top to bottom, then left to right.
    pub fn merge(&self, tokens: &[PositionedToken]) -> Vec<String> {
        self.group(tokens)
            .into_iter()
            .flat_map(|line| line.blocks.into_iter().map(|b| b.text))
            .collect()
    }
}

impl Default for LineMerger {
    fn default() -> Self {
        Self {
            x_tolerance: DEFAULT_TOLERANCE,
            y_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Merge same-line tokens and return block texts in reading order.
///
/// Tolerances default to [`DEFAULT_TOLERANCE`].
pub fn merge_text_items(
    tokens: &[PositionedToken],
    x_tolerance: Option<f64>,
    y_tolerance: Option<f64>,
) -> Vec<String> {
    LineMerger::new(
        x_tolerance.unwrap_or(DEFAULT_TOLERANCE),
        y_tolerance.unwrap_or(DEFAULT_TOLERANCE),
    )
    .merge(tokens)
}
