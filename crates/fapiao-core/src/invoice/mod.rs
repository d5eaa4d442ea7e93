//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{
    extract_invoice_info, normalize_lines, CascadeInvoiceParser, ExtractionResult, InvoiceParser,
};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
