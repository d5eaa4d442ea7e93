//! Common regex patterns for Chinese invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Traditional financial numerals used for amounts written out in words
    // (e.g. "贰拾壹圆整").
    pub static ref CHINESE_AMOUNT: Regex = Regex::new(
        r"[壹贰叁肆伍陆柒捌玖拾佰仟万亿元角分整]+"
    ).unwrap();

    // First run of ASCII digits and dots inside a line.
    pub static ref NUMERIC_RUN: Regex = Regex::new(
        r"[0-9.]+"
    ).unwrap();

    // Leading decimal number, as far as it parses; trailing text is ignored.
    pub static ref FLOAT_PREFIX: Regex = Regex::new(
        r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?"
    ).unwrap();

    // A complete plain decimal: nothing before or after it.
    pub static ref PLAIN_DECIMAL: Regex = Regex::new(
        r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$"
    ).unwrap();
}

/// Currency glyph that marks printed amounts.
pub const CURRENCY_MARK: char = '¥';

/// Characters removed from loosely matched dates before positional parsing.
pub const DATE_MARKERS: [char; 3] = ['年', '月', '日'];

/// Length of the short (paper) invoice code and of compact `YYYYMMDD` dates.
pub const SHORT_CODE_LEN: usize = 8;

/// Length of the electronic invoice number.
pub const ELECTRONIC_CODE_LEN: usize = 20;

/// Length of a `YYYY年MM月DD日` rendering.
pub const MARKED_DATE_LEN: usize = 11;

/// Whether `s` is non-empty and made only of ASCII digits.
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_digits() {
        assert!(is_digits("03100012"));
        assert!(!is_digits(""));
        assert!(!is_digits("2024年"));
        assert!(!is_digits("１２"));
    }

    #[test]
    fn test_chinese_amount() {
        assert!(CHINESE_AMOUNT.is_match("贰拾壹圆整21.00"));
        assert!(!CHINESE_AMOUNT.is_match("合计21.00"));
    }

    #[test]
    fn test_float_prefix() {
        assert_eq!(FLOAT_PREFIX.find("88.00元").map(|m| m.as_str()), Some("88.00"));
        assert_eq!(FLOAT_PREFIX.find(".5").map(|m| m.as_str()), Some(".5"));
        assert!(FLOAT_PREFIX.find("合计").is_none());
    }
}
