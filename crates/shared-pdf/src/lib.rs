//! PDF text extraction for proofreading
//!
//! Turns an uploaded PDF into page-marked plain text:
//!
//! ```text
//! Page 1:
//! <collapsed page text>
//!
//! Page 2:
//! ...
//! ```

pub mod extract;

pub use extract::{ExtractedPage, PdfError, PdfTextExtractor, DEFAULT_MAX_PDF_BYTES};
