//! Issue date extraction for Chinese invoices.
//!
//! All strategies return the date as a digit string in `YYYYMMDD` order,
//! which [`format_date`] then turns into `YYYY年MM月DD日`.

use super::FieldStrategy;
use super::codes::short_digit_lines;
use super::patterns::{char_len, DATE_MARKERS, MARKED_DATE_LEN};

/// A compact 8-digit date in the reference year.
pub struct CurrentYearDate {
    year: String,
}

impl CurrentYearDate {
    pub fn new(reference_year: i32) -> Self {
        Self {
            year: reference_year.to_string(),
        }
    }
}

impl FieldStrategy for CurrentYearDate {
    type Output = String;

    fn name(&self) -> &'static str {
        "compact_current_year"
    }

    fn confidence(&self) -> f32 {
        0.9
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        short_digit_lines(lines)
            .find(|line| line.starts_with(&self.year))
            .cloned()
    }
}

/// A compact 8-digit date in the year before the reference year.
pub struct PreviousYearDate {
    year: String,
}

impl PreviousYearDate {
    pub fn new(reference_year: i32) -> Self {
        Self {
            year: (reference_year - 1).to_string(),
        }
    }
}

impl FieldStrategy for PreviousYearDate {
    type Output = String;

    fn name(&self) -> &'static str {
        "compact_previous_year"
    }

    fn confidence(&self) -> f32 {
        0.8
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        short_digit_lines(lines)
            .find(|line| line.starts_with(&self.year))
            .cloned()
    }
}

/// An 11-character line such as "2024年03月13日", in this or last year.
pub struct ElevenCharDate {
    current: String,
    previous: String,
}

impl ElevenCharDate {
    pub fn new(reference_year: i32) -> Self {
        Self {
            current: reference_year.to_string(),
            previous: (reference_year - 1).to_string(),
        }
    }
}

impl FieldStrategy for ElevenCharDate {
    type Output = String;

    fn name(&self) -> &'static str {
        "eleven_char"
    }

    fn confidence(&self) -> f32 {
        0.7
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        lines
            .iter()
            .filter(|line| char_len(line) == MARKED_DATE_LEN)
            .find(|line| line.starts_with(&self.current) || line.starts_with(&self.previous))
            .map(|line| clean_date(line))
    }
}

/// Free text like "开票日期：2024年03月13日", keyed on "<year>年".
///
/// Everything after the last occurrence of the year digits is kept, which
/// also copes with lines whose characters came out of the PDF reordered.
pub struct YearMarkerDate {
    year: String,
    marker: String,
}

impl YearMarkerDate {
    pub fn new(reference_year: i32) -> Self {
        let year = reference_year.to_string();
        let marker = format!("{}年", year);
        Self { year, marker }
    }
}

impl FieldStrategy for YearMarkerDate {
    type Output = String;

    fn name(&self) -> &'static str {
        "year_marker"
    }

    fn confidence(&self) -> f32 {
        0.6
    }

    fn extract(&self, lines: &[String]) -> Option<String> {
        let line = lines.iter().find(|line| line.contains(&self.marker))?;
        let rest = line.rsplit(&self.year).next().unwrap_or_default();
        Some(clean_date(&format!("{}{}", self.year, rest)))
    }
}

/// Strip the 年/月/日 markers, leaving the digits in place.
pub fn clean_date(s: &str) -> String {
    s.chars().filter(|c| !DATE_MARKERS.contains(c)).collect()
}

/// Assemble `YYYY年MM月DD日` from character positions 0-3, 4-5 and 6-7.
///
/// Shorter input yields partial segments; anything past position 7 is dropped.
pub fn format_date(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let segment = |start: usize, end: usize| -> String {
        let end = end.min(chars.len());
        let start = start.min(end);
        chars[start..end].iter().collect()
    };

    format!("{}年{}月{}日", segment(0, 4), segment(4, 6), segment(6, 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_current_year_compact() {
        let input = lines(&["03100012", "20240313"]);
        assert_eq!(CurrentYearDate::new(2024).extract(&input), Some("20240313".to_string()));
        assert!(CurrentYearDate::new(2025).extract(&input).is_none());
    }

    #[test]
    fn test_previous_year_compact() {
        let input = lines(&["20231229"]);
        assert_eq!(PreviousYearDate::new(2024).extract(&input), Some("20231229".to_string()));
        assert!(PreviousYearDate::new(2026).extract(&input).is_none());
    }

    #[test]
    fn test_eleven_char_date() {
        let input = lines(&["2024年03月13日"]);
        assert_eq!(ElevenCharDate::new(2024).extract(&input), Some("20240313".to_string()));
        assert_eq!(ElevenCharDate::new(2025).extract(&input), Some("20240313".to_string()));
        assert!(ElevenCharDate::new(2027).extract(&input).is_none());
    }

    #[test]
    fn test_year_marker_date() {
        let input = lines(&["名称", "开票日期：2024年03月13日"]);
        assert_eq!(YearMarkerDate::new(2024).extract(&input), Some("20240313".to_string()));
    }

    #[test]
    fn test_year_marker_with_scrambled_markers() {
        let input = lines(&["开票日期：2024年月日0313"]);
        assert_eq!(YearMarkerDate::new(2024).extract(&input), Some("20240313".to_string()));
    }

    #[test]
    fn test_year_marker_only_matches_reference_year() {
        let input = lines(&["开票日期：2023年12月30日"]);
        assert!(YearMarkerDate::new(2024).extract(&input).is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("20240313"), "2024年03月13日");
        assert_eq!(format_date("2024031399"), "2024年03月13日");
        assert_eq!(format_date("202403"), "2024年03月日");
        assert_eq!(format_date(""), "年月日");
    }

    #[test]
    fn test_clean_date() {
        assert_eq!(clean_date("2024年03月13日"), "20240313");
    }
}
