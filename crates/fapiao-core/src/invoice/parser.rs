//! Cascading invoice parser over a reconstructed line sequence.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{FieldSource, InvoiceFields};

use super::rules::{
    amounts::format_amount, cascade, format_date, ChineseNumeralAmount, CurrencyMarkedAmount,
    CurrentYearDate, ElectronicCode, ElevenCharDate, ExtractionMatch, FieldStrategy, NonYearCode,
    PreviousYearDate, TrailingElectronicCode, YearMarkerDate,
};
use super::Result;

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: InvoiceFields,
    /// Normalized lines the fields were read from.
    pub lines: Vec<String>,
    /// Strategy behind each extracted field.
    pub sources: Vec<FieldSource>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields from the ordered lines of a whole document.
    fn parse(&self, lines: &[String]) -> Result<ExtractionResult>;
}

/// Parser that runs each field's strategies in priority order.
#[derive(Debug, Clone)]
pub struct CascadeInvoiceParser {
    /// Year used to tell 8-digit codes from 8-digit dates.
    reference_year: i32,
    /// Whether a missing amount is an error.
    require_amount: bool,
}

impl CascadeInvoiceParser {
    /// Create a parser keyed on the current local year.
    pub fn new() -> Self {
        Self {
            reference_year: current_year(),
            require_amount: false,
        }
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_reference_year(config.reference_year.unwrap_or_else(current_year))
            .with_require_amount(config.require_amount)
    }

    /// Set the reference year.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Set whether a missing amount is an error.
    pub fn with_require_amount(mut self, require: bool) -> Self {
        self.require_amount = require;
        self
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Extract all three fields. Never fails; missing fields stay `None`.
    pub fn extract_fields(&self, lines: &[String]) -> (InvoiceFields, Vec<FieldSource>) {
        let year = self.reference_year;
        let mut sources = Vec::new();

        let amount_strategies: [&dyn FieldStrategy<Output = Decimal>; 2] =
            [&CurrencyMarkedAmount, &ChineseNumeralAmount];
        let money = cascade(&amount_strategies, lines).map(|m| m.map(format_amount));

        let short_code = NonYearCode::new(year);
        let code_strategies: [&dyn FieldStrategy<Output = String>; 3] =
            [&short_code, &ElectronicCode, &TrailingElectronicCode];
        let code = cascade(&code_strategies, lines);

        let current = CurrentYearDate::new(year);
        let previous = PreviousYearDate::new(year);
        let eleven = ElevenCharDate::new(year);
        let marker = YearMarkerDate::new(year);
        let date_strategies: [&dyn FieldStrategy<Output = String>; 4] =
            [&current, &previous, &eleven, &marker];
        let date = cascade(&date_strategies, lines).map(|m| m.map(|d| format_date(&d)));

        let fields = InvoiceFields {
            date: record("date", date, &mut sources),
            code: record("code", code, &mut sources),
            money: record("money", money, &mut sources),
        };

        (fields, sources)
    }
}

impl Default for CascadeInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for CascadeInvoiceParser {
    fn parse(&self, lines: &[String]) -> Result<ExtractionResult> {
        let stopwatch = Stopwatch::start();

        let lines = normalize_lines(lines);
        info!("Parsing invoice from {} lines", lines.len());

        let (fields, sources) = self.extract_fields(&lines);

        if self.require_amount && fields.money.is_none() {
            return Err(ExtractionError::NoAmount);
        }

        let warnings: Vec<String> = fields
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        debug!(
            "Extracted date={:?} code={:?} money={:?} ({} warnings)",
            fields.date,
            fields.code,
            fields.money,
            warnings.len()
        );

        Ok(ExtractionResult {
            fields,
            lines,
            sources,
            warnings,
            processing_time_ms: stopwatch.elapsed_ms(),
        })
    }
}

fn record(
    field: &'static str,
    found: Option<ExtractionMatch<String>>,
    sources: &mut Vec<FieldSource>,
) -> Option<String> {
    let found = found?;
    debug!("{} from {}: {}", field, found.strategy, found.value);
    sources.push(FieldSource {
        field,
        strategy: found.strategy,
        confidence: found.confidence,
    });
    Some(found.value)
}

/// Times a parse. wasm32-unknown-unknown has no clock and reports 0.
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_ms(&self) -> u64 {
        0
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Remove every space character and drop lines left empty.
pub fn normalize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref().replace(' ', ""))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Extract date, code and amount from a document's ordered lines.
///
/// `reference_year` separates 8-digit codes from 8-digit dates: a compact
/// date of this year starts with these four digits, a code does not.
pub fn extract_invoice_info<S: AsRef<str>>(lines: &[S], reference_year: i32) -> InvoiceFields {
    let parser = CascadeInvoiceParser::new().with_reference_year(reference_year);
    parser.extract_fields(&normalize_lines(lines)).0
}
