//! File names for renamed invoices.
//!
//! A renamed invoice is called `<claimant>+<code>+<money>+<date>.pdf`, and
//! a details file lists every generated name, one per line.

use crate::models::invoice::InvoiceFields;

const EXTENSION: &str = "pdf";

/// Renders invoice file names for one claimant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilename {
    claimant: String,
    separator: String,
}

impl InvoiceFilename {
    pub fn new(claimant: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            claimant: claimant.into(),
            separator: separator.into(),
        }
    }

    /// Render the file name for `fields`. Missing fields leave their
    /// segment empty.
    pub fn render(&self, fields: &InvoiceFields) -> String {
        let segments = [
            self.claimant.as_str(),
            fields.code.as_deref().unwrap_or_default(),
            fields.money.as_deref().unwrap_or_default(),
            fields.date.as_deref().unwrap_or_default(),
        ];
        let stem = sanitize(&segments.join(&self.separator));
        format!("{}.{}", stem, EXTENSION)
    }
}

/// Insert ` (n)` before the extension, for name collisions.
pub fn numbered(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", name, n),
    }
}

/// Contents of the details file: one name per line.
pub fn details_listing<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace characters that are not allowed in file names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(date: Option<&str>, code: Option<&str>, money: Option<&str>) -> InvoiceFields {
        InvoiceFields {
            date: date.map(str::to_string),
            code: code.map(str::to_string),
            money: money.map(str::to_string),
        }
    }

    #[test]
    fn test_render() {
        let name = InvoiceFilename::new("张三", "+").render(&fields(
            Some("2024年03月13日"),
            Some("03100012"),
            Some("88.00"),
        ));
        assert_eq!(name, "张三+03100012+88.00+2024年03月13日.pdf");
    }

    #[test]
    fn test_missing_fields_leave_empty_segments() {
        let name = InvoiceFilename::new("张三", "+").render(&fields(None, None, Some("21.00")));
        assert_eq!(name, "张三++21.00+.pdf");
    }

    #[test]
    fn test_illegal_characters() {
        let name = InvoiceFilename::new("a/b", ":").render(&InvoiceFields::default());
        assert_eq!(name, "a_b___.pdf");
    }

    #[test]
    fn test_numbered() {
        assert_eq!(numbered("a+b.pdf", 2), "a+b (2).pdf");
        assert_eq!(numbered("noext", 1), "noext (1)");
    }

    #[test]
    fn test_details_listing() {
        assert_eq!(details_listing(&["a.pdf", "b.pdf"]), "a.pdf\nb.pdf");
        assert_eq!(details_listing::<&str>(&[]), "");
    }
}
