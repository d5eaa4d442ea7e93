//! Amount extraction for Chinese invoices.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::FieldStrategy;
use super::patterns::{CHINESE_AMOUNT, CURRENCY_MARK, FLOAT_PREFIX, NUMERIC_RUN, PLAIN_DECIMAL};

/// Amounts printed after a `¥` mark; the largest one is the total.
///
/// Invoices print per-item amounts and tax next to the grand total, and the
/// total is always the biggest currency value on the page.
pub struct CurrencyMarkedAmount;

impl CurrencyMarkedAmount {
    /// Every parsable amount following a currency mark.
    pub fn candidates(&self, lines: &[String]) -> Vec<Decimal> {
        lines
            .iter()
            .filter(|line| line.contains(CURRENCY_MARK))
            .flat_map(|line| line.split(CURRENCY_MARK))
            .filter(|segment| !segment.is_empty())
            .filter_map(parse_float_prefix)
            .collect()
    }
}

impl FieldStrategy for CurrencyMarkedAmount {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "currency_marked"
    }

    fn confidence(&self) -> f32 {
        0.9
    }

    fn extract(&self, lines: &[String]) -> Option<Decimal> {
        self.candidates(lines).into_iter().max()
    }
}

/// Digits printed next to an amount written in financial numerals.
///
/// Only the Arabic rendering on the same line is read (as in
/// "贰拾壹圆整21.00"); the numeral characters themselves are not converted.
pub struct ChineseNumeralAmount;

impl ChineseNumeralAmount {
    pub fn candidates(&self, lines: &[String]) -> Vec<Decimal> {
        lines
            .iter()
            .filter(|line| CHINESE_AMOUNT.is_match(line))
            .filter_map(|line| NUMERIC_RUN.find(line))
            .filter(|run| PLAIN_DECIMAL.is_match(run.as_str()))
            .filter_map(|run| parse_float_prefix(run.as_str()))
            .collect()
    }
}

impl FieldStrategy for ChineseNumeralAmount {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "chinese_numeral"
    }

    fn confidence(&self) -> f32 {
        0.6
    }

    fn extract(&self, lines: &[String]) -> Option<Decimal> {
        self.candidates(lines).into_iter().max()
    }
}

/// Parse the leading number of `s`, ignoring whatever follows it.
///
/// `"88.00元"` parses as 88.00, `"合计"` does not parse.
pub fn parse_float_prefix(s: &str) -> Option<Decimal> {
    let number = FLOAT_PREFIX.find(s.trim_start())?.as_str();

    if number.contains(['e', 'E']) {
        Decimal::from_scientific(number).ok()
    } else {
        // "21." is a valid prefix but not a valid Decimal literal.
        Decimal::from_str(number.trim_end_matches('.')).ok()
    }
}

/// Render an amount with exactly two decimals, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
