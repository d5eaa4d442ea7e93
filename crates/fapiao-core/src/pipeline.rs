//! Page-by-page driver from a page text source to invoice fields.

use tracing::{debug, info};

use crate::error::Result;
use crate::invoice::{ExtractionResult, InvoiceParser};
use crate::layout::LineMerger;
use crate::pdf::PageTextSource;

/// Reconstruct the lines of one page.
pub fn page_lines<S: PageTextSource + ?Sized>(
    source: &S,
    merger: &LineMerger,
    page: u32,
) -> Result<Vec<String>> {
    let tokens = source.page_tokens(page)?;
    let lines = merger.merge(&tokens);
    debug!("Page {}: {} tokens -> {} lines", page, tokens.len(), lines.len());
    Ok(lines)
}

/// Reconstruct the lines of a whole document, page after page.
///
/// `max_pages` of 0 reads every page.
pub fn document_lines<S: PageTextSource + ?Sized>(
    source: &S,
    merger: &LineMerger,
    max_pages: usize,
) -> Result<Vec<String>> {
    let total = source.page_count();
    let last = match u32::try_from(max_pages) {
        Ok(limit) if limit > 0 => total.min(limit),
        _ => total,
    };

    let mut lines = Vec::new();
    for page in 1..=last {
        lines.extend(page_lines(source, merger, page)?);
    }
    Ok(lines)
}

/// Run the full pipeline over a page source.
pub fn parse_invoice<S, P>(
    source: &S,
    merger: &LineMerger,
    parser: &P,
    max_pages: usize,
) -> Result<ExtractionResult>
where
    S: PageTextSource + ?Sized,
    P: InvoiceParser + ?Sized,
{
    let lines = document_lines(source, merger, max_pages)?;
    info!(
        "Reconstructed {} lines from {} pages",
        lines.len(),
        source.page_count()
    );
    Ok(parser.parse(&lines)?)
}

/// Load a PDF from memory and extract its invoice fields.
#[cfg(feature = "pdf")]
pub fn parse_invoice_pdf(
    data: &[u8],
    config: &crate::models::config::FapiaoConfig,
) -> Result<ExtractionResult> {
    use crate::invoice::CascadeInvoiceParser;
    use crate::pdf::PdfTokenSource;

    let source = PdfTokenSource::load(data, &config.pdf.password)?;
    let merger = LineMerger::from_config(&config.layout);
    let parser = CascadeInvoiceParser::from_config(&config.extraction);
    parse_invoice(&source, &merger, &parser, config.pdf.max_pages)
}
