//! Page text sources.
//!
//! A source yields the positioned text tokens of one page at a time. The
//! PDF-backed source lives behind the `pdf` feature; browsers feed tokens
//! from pdf.js through [`StaticPages`] instead.

#[cfg(feature = "pdf")]
mod extractor;

#[cfg(feature = "pdf")]
pub use extractor::PdfTokenSource;

use crate::error::PdfError;
use crate::layout::PositionedToken;

/// Result type for page source operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Something that can report the positioned text of each page.
pub trait PageTextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Tokens of one page (1-indexed), in no particular order.
    fn page_tokens(&self, page: u32) -> Result<Vec<PositionedToken>>;
}

/// Pages whose tokens are already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPages {
    pages: Vec<Vec<PositionedToken>>,
}

impl StaticPages {
    pub fn new(pages: Vec<Vec<PositionedToken>>) -> Self {
        Self { pages }
    }

    /// Append a page.
    pub fn push_page(&mut self, tokens: Vec<PositionedToken>) {
        self.pages.push(tokens);
    }
}

impl PageTextSource for StaticPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_tokens(&self, page: u32) -> Result<Vec<PositionedToken>> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_pages_are_one_indexed() {
        let pages = StaticPages::new(vec![
            vec![PositionedToken::new("a", 0.0, 0.0, 1.0, 1.0)],
            vec![],
        ]);

        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_tokens(1).unwrap()[0].text, "a");
        assert!(pages.page_tokens(2).unwrap().is_empty());
        assert!(matches!(pages.page_tokens(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(pages.page_tokens(3), Err(PdfError::InvalidPage(3))));
    }
}
