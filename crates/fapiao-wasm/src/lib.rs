//! WASM bindings for Chinese tax-invoice field extraction.
//!
//! Browsers read page text with pdf.js (`page.getTextContent()`); these
//! bindings take its text items, rebuild the lines and extract the fields.

use js_sys::{Array, Promise};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use fapiao_core::invoice::{CascadeInvoiceParser, InvoiceParser};
use fapiao_core::layout::{LineMerger, PositionedToken};
use fapiao_core::naming::InvoiceFilename;
use fapiao_core::pdf::StaticPages;
use fapiao_core::pipeline::{document_lines, parse_invoice};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A text item as returned by pdf.js `getTextContent()`.
///
/// Marked-content entries carry no `str`; they deserialize empty and are
/// skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PdfJsTextItem {
    str: String,
    transform: Vec<f64>,
    width: f64,
    height: f64,
}

impl PdfJsTextItem {
    fn into_token(self) -> Option<PositionedToken> {
        if self.str.is_empty() || self.transform.len() < 6 {
            return None;
        }
        let (x, y) = (self.transform[4], self.transform[5]);
        Some(PositionedToken::new(self.str, x, y, self.width, self.height))
    }
}

/// The object pdf.js resolves `getTextContent()` to.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PdfJsTextContent {
    items: Vec<PdfJsTextItem>,
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn tokens_from_items(items: JsValue) -> Result<Vec<PositionedToken>, JsValue> {
    let items: Vec<PdfJsTextItem> = serde_wasm_bindgen::from_value(items).map_err(to_js_error)?;
    Ok(items
        .into_iter()
        .filter_map(PdfJsTextItem::into_token)
        .collect())
}

fn lines_to_array(lines: &[String]) -> Array {
    lines.iter().map(|line| JsValue::from_str(line)).collect()
}

fn parser_for(year: Option<i32>) -> CascadeInvoiceParser {
    match year {
        Some(year) => CascadeInvoiceParser::new().with_reference_year(year),
        None => CascadeInvoiceParser::new(),
    }
}

/// Rebuild the text lines of one page from pdf.js text items.
#[wasm_bindgen(js_name = mergeTextItems)]
pub fn merge_text_items(
    items: JsValue,
    x_tolerance: Option<f64>,
    y_tolerance: Option<f64>,
) -> Result<Array, JsValue> {
    let tokens = tokens_from_items(items)?;
    let lines = fapiao_core::merge_text_items(&tokens, x_tolerance, y_tolerance);
    Ok(lines_to_array(&lines))
}

/// Extract date, code and amount from a document's ordered lines.
///
/// `year` defaults to the current year.
#[wasm_bindgen(js_name = extractInvoiceInfo)]
pub fn extract_invoice_info(lines: JsValue, year: Option<i32>) -> Result<JsValue, JsValue> {
    let lines: Vec<String> = serde_wasm_bindgen::from_value(lines).map_err(to_js_error)?;
    let year = parser_for(year).reference_year();
    let fields = fapiao_core::extract_invoice_info(&lines, year);
    serde_wasm_bindgen::to_value(&fields).map_err(to_js_error)
}

/// Await pdf.js text content promises one page at a time, then extract.
///
/// `pages` is an array of `page.getTextContent()` promises, in page order.
#[wasm_bindgen(js_name = parseInvoicePages)]
pub async fn parse_invoice_pages(pages: Array, year: Option<i32>) -> Result<JsValue, JsValue> {
    let mut collector = PageCollector::new(year);
    for page in pages.iter() {
        let content = JsFuture::from(Promise::resolve(&page)).await?;
        let content: PdfJsTextContent =
            serde_wasm_bindgen::from_value(content).map_err(to_js_error)?;
        collector.push_items(content.items);
    }
    collector.extract()
}

/// Collects pages of pdf.js text items for one document.
#[wasm_bindgen]
pub struct PageCollector {
    pages: StaticPages,
    merger: LineMerger,
    parser: CascadeInvoiceParser,
}

#[wasm_bindgen]
impl PageCollector {
    /// Create a collector. `year` defaults to the current year.
    #[wasm_bindgen(constructor)]
    pub fn new(year: Option<i32>) -> Self {
        Self {
            pages: StaticPages::default(),
            merger: LineMerger::default(),
            parser: parser_for(year),
        }
    }

    /// Change the merge tolerances.
    #[wasm_bindgen(js_name = setTolerances)]
    pub fn set_tolerances(&mut self, x_tolerance: f64, y_tolerance: f64) {
        self.merger = LineMerger::new(x_tolerance, y_tolerance);
    }

    /// Add the next page's text items.
    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(&mut self, items: JsValue) -> Result<(), JsValue> {
        let tokens = tokens_from_items(items)?;
        self.pages.push_page(tokens);
        Ok(())
    }

    /// Lines of every page so far, in page order.
    #[wasm_bindgen]
    pub fn lines(&self) -> Result<Array, JsValue> {
        let lines = document_lines(&self.pages, &self.merger, 0).map_err(to_js_error)?;
        Ok(lines_to_array(&lines))
    }

    /// Extract the invoice fields with per-field sources and warnings.
    #[wasm_bindgen]
    pub fn extract(&self) -> Result<JsValue, JsValue> {
        let result =
            parse_invoice(&self.pages, &self.merger, &self.parser, 0).map_err(to_js_error)?;
        web_sys::console::debug_1(&JsValue::from_str(&format!(
            "fapiao: {} lines, {} warnings",
            result.lines.len(),
            result.warnings.len()
        )));
        serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
    }

    /// Build the renamed file name for the collected invoice.
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(&self, claimant: &str, separator: Option<String>) -> Result<String, JsValue> {
        let lines = document_lines(&self.pages, &self.merger, 0).map_err(to_js_error)?;
        let result = self.parser.parse(&lines).map_err(to_js_error)?;
        let separator = separator.unwrap_or_else(|| "+".to_string());
        Ok(InvoiceFilename::new(claimant, separator).render(&result.fields))
    }
}

impl PageCollector {
    fn push_items(&mut self, items: Vec<PdfJsTextItem>) {
        let tokens = items
            .into_iter()
            .filter_map(PdfJsTextItem::into_token)
            .collect();
        self.pages.push_page(tokens);
    }
}
