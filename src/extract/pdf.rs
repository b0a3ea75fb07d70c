//! pdfium-backed document decoding.
//!
//! Uses `pdfium-render` (Chromium's PDF library) to extract character
//! positions. Pages are stacked top to bottom in one coordinate space: every
//! later page is shifted down by the heights of the pages above it, so the
//! grid stages see a single descending-y document.

use pdfium_render::prelude::*;
use tracing::debug;

use super::{group_runs, PdfChar};
use crate::error::ParseError;
use crate::model::PositionedText;

/// Decode `bytes` and return its text runs.
///
/// A well-formed document with no text layer yields an empty vector; the
/// pipeline turns that into [`ParseError::NoTextFound`].
pub fn extract_runs(bytes: &[u8]) -> Result<Vec<PositionedText>, ParseError> {
    let (chars, page_count) = extract_chars(bytes)?;
    let runs = group_runs(&chars);
    debug!(
        "Extracted {} chars into {} runs across {} page(s)",
        chars.len(),
        runs.len(),
        page_count
    );
    Ok(runs)
}

/// Bind pdfium from the working directory first, then the system library.
fn bind_pdfium() -> Result<Pdfium, ParseError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ParseError::Extraction(format!("pdfium library not available: {e}")))?;
    Ok(Pdfium::new(bindings))
}

/// Extract all characters with their bounding rectangles from the document.
#[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
fn extract_chars(bytes: &[u8]) -> Result<(Vec<PdfChar>, usize), ParseError> {
    let pdfium = bind_pdfium()?;
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ParseError::Extraction(e.to_string()))?;
    let page_count = doc.pages().len() as usize;
    let mut chars = Vec::new();
    let mut y_offset = 0.0_f32;

    for (page_idx, page) in doc.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ParseError::Extraction(format!("page {}: {e}", page_idx + 1)))?;

        for ch in text.chars().iter() {
            let Some(unicode_ch) = ch.unicode_char() else {
                continue;
            };

            // Spaces and generated line breaks often have no glyph box but
            // still separate runs.
            if unicode_ch.is_whitespace() {
                chars.push(PdfChar {
                    ch: unicode_ch,
                    x: 0.0,
                    y: 0.0,
                    width: 0.0,
                    height: 0.0,
                    font_size: 0.0,
                    page: page_idx,
                });
                continue;
            }

            if let Ok(rect) = ch.tight_bounds() {
                chars.push(PdfChar {
                    ch: unicode_ch,
                    x: rect.left.value,
                    y: rect.bottom.value - y_offset,
                    width: (rect.right.value - rect.left.value).abs(),
                    height: (rect.top.value - rect.bottom.value).abs(),
                    font_size: ch.unscaled_font_size().value,
                    page: page_idx,
                });
            }
        }

        y_offset += page.height().value;
    }

    Ok((chars, page_count))
}
