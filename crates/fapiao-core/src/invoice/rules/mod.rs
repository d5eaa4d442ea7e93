//! Line-based field strategies for Chinese tax invoices.
//!
//! Each field is recovered by an ordered list of strategies. A strategy
//! looks at the whole normalized line sequence and proposes at most one
//! value; [`cascade`] runs them in priority order and keeps the first hit.

pub mod amounts;
pub mod codes;
pub mod dates;
pub mod patterns;

pub use amounts::{parse_float_prefix, ChineseNumeralAmount, CurrencyMarkedAmount};
pub use codes::{ElectronicCode, NonYearCode, TrailingElectronicCode};
pub use dates::{
    clean_date, format_date, CurrentYearDate, ElevenCharDate, PreviousYearDate, YearMarkerDate,
};
pub use patterns::*;

use serde::Serialize;
use tracing::trace;

/// A single candidate-producing strategy for one invoice field.
pub trait FieldStrategy {
    /// The type of value this strategy produces.
    type Output;

    /// Stable name, reported in extraction results.
    fn name(&self) -> &'static str;

    /// How much a hit from this strategy is trusted (0.0 - 1.0).
    fn confidence(&self) -> f32;

    /// Propose a value from the normalized lines, if any.
    fn extract(&self, lines: &[String]) -> Option<Self::Output>;
}

/// A value found by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Name of the strategy that produced the value.
    pub strategy: &'static str,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, strategy: &'static str) -> Self {
        Self {
            value,
            confidence,
            strategy,
        }
    }

    /// Transform the value, keeping provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            confidence: self.confidence,
            strategy: self.strategy,
        }
    }
}

/// Run strategies in order and return the first value found.
pub fn cascade<T>(
    strategies: &[&dyn FieldStrategy<Output = T>],
    lines: &[String],
) -> Option<ExtractionMatch<T>> {
    strategies.iter().find_map(|strategy| {
        let value = strategy.extract(lines);
        trace!("strategy {} -> {}", strategy.name(), value.is_some());
        value.map(|v| ExtractionMatch::new(v, strategy.confidence(), strategy.name()))
    })
}
