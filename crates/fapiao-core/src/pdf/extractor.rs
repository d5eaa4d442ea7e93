//! Positioned text extraction using lopdf and pdf-extract.

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, trace};

use super::{PageTextSource, Result};
use crate::error::PdfError;
use crate::layout::PositionedToken;

/// Page source backed by a PDF file.
///
/// Every page is read once on load; `page_tokens` hands out copies.
#[derive(Debug, Clone)]
pub struct PdfTokenSource {
    pages: Vec<Vec<PositionedToken>>,
}

impl PdfTokenSource {
    /// Load a PDF from memory, decrypting it with `password` if needed.
    pub fn load(data: &[u8], password: &str) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw = if doc.is_encrypted() {
            if doc.decrypt(password).is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        // pdf-extract walks the content streams with its own lopdf build.
        let extract_doc = pdf_extract::Document::load_mem(&raw)
            .map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut collector = TokenCollector::default();
        pdf_extract::output_doc(&extract_doc, &mut collector)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let mut pages = collector.pages;
        pages.resize_with(page_count, Vec::new);

        debug!(
            "Loaded PDF: {} pages, {} tokens",
            page_count,
            pages.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self { pages })
    }

    /// Load a PDF that is not password protected.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::load(data, "")
    }
}

impl PageTextSource for PdfTokenSource {
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

/// Groups the glyphs pdf-extract reports into one token per word.
#[derive(Default)]
struct TokenCollector {
    pages: Vec<Vec<PositionedToken>>,
    current: Option<PositionedToken>,
}

impl TokenCollector {
    fn flush(&mut self) {
        if let Some(token) = self.current.take() {
            if token.text.trim().is_empty() {
                return;
            }
            if let Some(page) = self.pages.last_mut() {
                page.push(token);
            }
        }
    }
}

impl OutputDev for TokenCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        trace!("Reading page {}", page_num);
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        // Text space to device space, without the y flip: y grows upwards.
        let (x, y) = (trm.m31, trm.m32);
        let sx = font_size * trm.m11 + font_size * trm.m21;
        let sy = font_size * trm.m12 + font_size * trm.m22;
        let size = (sx * sy).abs().sqrt();
        let advance = width * size;

        match self.current.as_mut() {
            Some(token) if token.y == y => {
                token.text.push_str(char);
                token.width = (x + advance - token.x).max(token.width);
                token.height = token.height.max(size);
            }
            _ => {
                self.flush();
                self.current = Some(PositionedToken::new(char, x, y, advance, size));
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LineMerger;
    use crate::pipeline::document_lines;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One page of Helvetica text, one `(x, y, bytes)` run per entry.
    fn build_pdf(runs: &[(i64, i64, &[u8])]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        for (x, y, text) in runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text.to_vec())]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_reads_positioned_text() {
        let data = build_pdf(&[
            (72, 600, b"20240313"),
            (72, 700, b"03100012"),
            (300, 500, b"\xa588.00"),
        ]);

        let source = PdfTokenSource::from_bytes(&data).unwrap();
        assert_eq!(source.page_count(), 1);
        assert!(!source.page_tokens(1).unwrap().is_empty());

        let lines = document_lines(&source, &LineMerger::default(), 0).unwrap();
        assert_eq!(lines, vec!["03100012", "20240313", "¥88.00"]);
    }

    #[test]
    fn test_rejects_non_pdf() {
        let result = PdfTokenSource::from_bytes(b"not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_collector_groups_word_glyphs() {
        let mut collector = TokenCollector::default();
        let media = MediaBox {
            llx: 0.0,
            lly: 0.0,
            urx: 600.0,
            ury: 800.0,
        };
        let glyph = |x: f64| Transform::row_major(1.0, 0.0, 0.0, 1.0, x, 700.0);

        collector.begin_page(1, &media, None).unwrap();
        collector.begin_word().unwrap();
        collector.output_character(&glyph(10.0), 1.0, 0.0, 12.0, "¥").unwrap();
        collector.output_character(&glyph(22.0), 0.5, 0.0, 12.0, "8").unwrap();
        collector.end_word().unwrap();
        collector.begin_word().unwrap();
        collector.output_character(&glyph(100.0), 0.5, 0.0, 12.0, " ").unwrap();
        collector.end_word().unwrap();
        collector.end_page().unwrap();

        assert_eq!(collector.pages.len(), 1);
        let tokens = &collector.pages[0];
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "¥8");
        assert_eq!(tokens[0].x, 10.0);
        assert_eq!(tokens[0].y, 700.0);
        assert_eq!(tokens[0].width, 18.0);
        assert_eq!(tokens[0].height, 12.0);
    }
}
