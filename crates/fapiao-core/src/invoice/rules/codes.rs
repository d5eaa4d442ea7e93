//! Invoice code extraction.
//!
//! Paper invoices carry an 8-digit code, which looks exactly like a compact
//! `YYYYMMDD` issue date. Electronic invoices carry a 20-digit number.

use super::FieldStrategy;
use super::patterns::{char_len, is_digits, ELECTRONIC_CODE_LEN, SHORT_CODE_LEN};

/// Lines that are exactly eight digits: either a short code or a compact date.
pub fn short_digit_lines(lines: &[String]) -> impl Iterator<Item = &String> {
    lines
        .iter()
        .filter(|line| char_len(line) == SHORT_CODE_LEN && is_digits(line))
}

/// An 8-digit line that does not start with the reference year.
pub struct NonYearCode {
    year: String,
}

impl NonYearCode {
    pub fn new(reference_year: i32) -> Self {
        Self {
            year: reference_year.to_string(),
        }
    }
}

impl FieldStrategy for NonYearCode {
    type Output = String;

    fn name(&self) -> &'static str {
        "short_code"
    }

    fn confidence(&self) -> f32 {
        0.8
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        short_digit_lines(lines)
            .find(|line| !line.starts_with(&self.year))
            .cloned()
    }
}

/// A line that is exactly the 20-digit electronic invoice number.
pub struct ElectronicCode;

impl FieldStrategy for ElectronicCode {
    type Output = String;

    fn name(&self) -> &'static str {
        "electronic_code"
    }

    fn confidence(&self) -> f32 {
        0.9
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        lines
            .iter()
            .find(|line| char_len(line) == ELECTRONIC_CODE_LEN && is_digits(line))
            .cloned()
    }
}

/// A labeled line ending in the 20-digit number, e.g. "发票号码：2431...".
pub struct TrailingElectronicCode;

impl TrailingElectronicCode {
    /// The trailing 20 characters of `line`, if it is longer than that.
    fn tail(line: &str) -> Option<&str> {
        let len = char_len(line);
        if len <= ELECTRONIC_CODE_LEN {
            return None;
        }
        let start = line
            .char_indices()
            .nth(len - ELECTRONIC_CODE_LEN)
            .map(|(i, _)| i)?;
        Some(&line[start..])
    }
}

impl FieldStrategy for TrailingElectronicCode {
    type Output = String;

    fn name(&self) -> &'static str {
        "trailing_electronic_code"
    }

    fn confidence(&self) -> f32 {
        0.85
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        lines
            .iter()
            .filter_map(|line| Self::tail(line))
            .find(|tail| is_digits(tail))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_code_skips_year_prefixed_line() {
        let input = lines(&["20240313", "03100012"]);
        assert_eq!(NonYearCode::new(2024).extract(&input), Some("03100012".to_string()));
    }

    #[test]
    fn test_short_code_requires_exact_length() {
        let input = lines(&["0310001", "031000123", "0310001a"]);
        assert!(NonYearCode::new(2024).extract(&input).is_none());
    }

    #[test]
    fn test_short_code_depends_on_reference_year() {
        let input = lines(&["20240313"]);
        assert!(NonYearCode::new(2024).extract(&input).is_none());
        assert_eq!(NonYearCode::new(2025).extract(&input), Some("20240313".to_string()));
    }

    #[test]
    fn test_electronic_code() {
        let input = lines(&["名称", "24317000000075757963"]);
        assert_eq!(
            ElectronicCode.extract(&input),
            Some("24317000000075757963".to_string())
        );
        assert!(ElectronicCode.extract(&lines(&["2431700000007575796"])).is_none());
    }

    #[test]
    fn test_trailing_electronic_code() {
        let input = lines(&["发票号码：24317000000075757963"]);
        assert_eq!(
            TrailingElectronicCode.extract(&input),
            Some("24317000000075757963".to_string())
        );
    }

    #[test]
    fn test_trailing_code_needs_longer_line() {
        let input = lines(&["24317000000075757963"]);
        assert!(TrailingElectronicCode.extract(&input).is_none());

        let input = lines(&["发票号码：2431700000007575796X"]);
        assert!(TrailingElectronicCode.extract(&input).is_none());
    }
}
