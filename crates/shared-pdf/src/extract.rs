use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    #[error("PDF is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Password-protected PDF")]
    Encrypted,

    #[error("Invalid PDF: {0}")]
    Invalid(String),

    #[error("No text content found (scanned or image-based PDF)")]
    NoText,
}

/// Text of one page, whitespace already collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub number: u32,
    pub text: String,
}

/// PDF to page-marked text
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    max_bytes: usize,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PDF_BYTES)
    }
}

impl PdfTextExtractor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Extract the document as `"Page N:\n<text>\n\n"` blocks, skipping
    /// pages without text
    ///
    /// # Errors
    /// - `PdfError::TooLarge` - input exceeds the configured limit
    /// - `PdfError::Encrypted` - the PDF needs a password
    /// - `PdfError::Invalid` - the bytes are not a readable PDF
    /// - `PdfError::NoText` - every page is empty
    pub fn extract(&self, bytes: &[u8]) -> Result<String, PdfError> {
        let pages = self.extract_pages(bytes)?;
        Ok(pages
            .iter()
            .map(|p| format!("Page {}:\n{}\n\n", p.number, p.text))
            .collect())
    }

    /// Non-empty pages in document order
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<ExtractedPage>, PdfError> {
        if bytes.len() > self.max_bytes {
            return Err(PdfError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let doc = Document::load_mem(bytes).map_err(|e| {
            let message = e.to_string();
            let lower = message.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                PdfError::Encrypted
            } else {
                PdfError::Invalid(message)
            }
        })?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        let mut pages: Vec<ExtractedPage> = doc
            .get_pages()
            .keys()
            .filter_map(|&number| {
                let raw = match doc.extract_text(&[number]) {
                    Ok(raw) => raw,
                    Err(e) => {
                        debug!(page = number, error = %e, "Page text extraction failed");
                        return None;
                    }
                };
                let text = collapse_whitespace(&raw);
                (!text.is_empty()).then_some(ExtractedPage { number, text })
            })
            .collect();

        if pages.is_empty() {
            pages = fallback_pages(bytes);
        }

        if pages.is_empty() {
            warn!("PDF has no extractable text");
            return Err(PdfError::NoText);
        }

        debug!(pages = pages.len(), "Extracted PDF text");
        Ok(pages)
    }
}

/// Second pass through pdf-extract for fonts lopdf cannot decode.
/// Pages come back separated by form feeds.
fn fallback_pages(bytes: &[u8]) -> Vec<ExtractedPage> {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "pdf-extract fallback failed");
            return Vec::new();
        }
    };

    text.split('\x0C')
        .enumerate()
        .filter_map(|(idx, page)| {
            let text = collapse_whitespace(page);
            (!text.is_empty()).then_some(ExtractedPage {
                number: idx as u32 + 1,
                text,
            })
        })
        .collect()
}

/// Runs of whitespace become one space; ends trimmed
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Object, Stream};
    use pretty_assertions::assert_eq;

    /// Build a PDF whose pages show the given strings (empty string = blank page)
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Dear   member,\n\n\tWelcome  "), "Dear member, Welcome");
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_page_markers() {
        let pdf = build_pdf(&["Welcome member", "Ask our staff"]);
        let text = PdfTextExtractor::default().extract(&pdf).unwrap();
        assert_eq!(
            text,
            "Page 1:\nWelcome member\n\nPage 2:\nAsk our staff\n\n"
        );
    }

    #[test]
    fn test_blank_pages_are_skipped() {
        let pdf = build_pdf(&["Cover", "", "Back page"]);
        let pages = PdfTextExtractor::default().extract_pages(&pdf).unwrap();
        let numbers: Vec<_> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_all_blank_is_no_text() {
        let pdf = build_pdf(&["", ""]);
        assert_eq!(
            PdfTextExtractor::default().extract(&pdf),
            Err(PdfError::NoText)
        );
    }

    #[test]
    fn test_size_limit() {
        let pdf = build_pdf(&["Welcome member"]);
        let err = PdfTextExtractor::new(16).extract(&pdf).unwrap_err();
        assert!(matches!(err, PdfError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let err = PdfTextExtractor::default()
            .extract(b"this is not a pdf")
            .unwrap_err();
        assert!(matches!(err, PdfError::Invalid(_)));
    }
}
