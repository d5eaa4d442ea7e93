//! Core library for Chinese tax-invoice (发票) PDFs.
//!
//! This crate provides:
//! - Line reconstruction from positioned page text
//! - Invoice field extraction (date, code, total amount)
//! - PDF page text sources (feature `pdf`)
//! - File naming for renamed invoices

pub mod error;
pub mod invoice;
pub mod layout;
pub mod models;
pub mod naming;
pub mod pdf;
pub mod pipeline;

pub use error::{ExtractionError, FapiaoError, PdfError, Result};
pub use invoice::{
    extract_invoice_info, normalize_lines, CascadeInvoiceParser, ExtractionResult, InvoiceParser,
};
pub use layout::{merge_text_items, LineGroup, LineMerger, PositionedToken, TextBlock};
pub use models::config::FapiaoConfig;
pub use models::invoice::{FieldSource, InvoiceFields};
pub use naming::{details_listing, InvoiceFilename};
pub use pdf::{PageTextSource, StaticPages};
#[cfg(feature = "pdf")]
pub use pdf::PdfTokenSource;
pub use pipeline::{document_lines, page_lines, parse_invoice};
#[cfg(feature = "pdf")]
pub use pipeline::parse_invoice_pdf;
