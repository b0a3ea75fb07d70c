//! Text extraction: document bytes → ordered [`PositionedText`] runs.
//!
//! # Pipeline
//!
//! ```text
//! PDF bytes → pdfium char extraction → run grouping → rounding/filtering
//! ```
//!
//! Only the first step touches pdfium (feature `pdf`); run grouping works on
//! plain [`PdfChar`] values so it can be exercised without the library.

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::extract_runs;

use crate::model::PositionedText;

/// A positioned character extracted from a PDF page.
#[derive(Debug, Clone)]
pub struct PdfChar {
    pub ch: char,
    /// Left edge in PDF points (1pt = 1/72 inch).
    pub x: f32,
    /// Baseline Y position (bottom-up, pages stacked downward).
    pub y: f32,
    pub width: f32,
    /// Glyph box height, used when the font size is unknown.
    pub height: f32,
    pub font_size: f32,
    /// Page index (0-based).
    pub page: usize,
}

/// Round a coordinate to one decimal place.
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Run under construction.
struct RunBuilder {
    text: String,
    left: f32,
    right: f32,
    y: f32,
    font_size: f32,
    page: usize,
    pending_space: bool,
}

impl RunBuilder {
    fn start(ch: &PdfChar) -> Self {
        let mut text = String::new();
        text.push(ch.ch);
        Self {
            text,
            left: ch.x,
            right: ch.x + ch.width,
            y: ch.y,
            font_size: effective_size(ch),
            page: ch.page,
            pending_space: false,
        }
    }

    /// Whether `ch` belongs to a different run than this one.
    fn breaks_at(&self, ch: &PdfChar) -> bool {
        let size = self.font_size.max(effective_size(ch)).max(1.0);
        ch.page != self.page || (ch.y - self.y).abs() > size * 0.5 || ch.x - self.right > size
    }

    fn push(&mut self, ch: &PdfChar) {
        if self.pending_space {
            self.text.push(' ');
            self.pending_space = false;
        }
        self.text.push(ch.ch);
        self.right = self.right.max(ch.x + ch.width);
        self.font_size = self.font_size.max(effective_size(ch));
    }

    fn finish(self) -> Option<PositionedText> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(PositionedText::new(
            text,
            round1(self.left),
            round1(self.y),
            round1(self.right - self.left),
            round1(self.font_size),
        ))
    }
}

fn effective_size(ch: &PdfChar) -> f32 {
    if ch.font_size > 0.0 {
        ch.font_size
    } else {
        ch.height
    }
}

/// Group characters (in content order) into text runs.
///
/// A run ends at a line break, a page change, a baseline shift of more than
/// half the font size, or a horizontal gap wider than the font size.
/// Whitespace inside a run collapses to one space; blank runs are dropped.
pub fn group_runs(chars: &[PdfChar]) -> Vec<PositionedText> {
    let mut runs = Vec::new();
    let mut current: Option<RunBuilder> = None;

    for ch in chars {
        if ch.ch == '\n' || ch.ch == '\r' {
            if let Some(run) = current.take().and_then(RunBuilder::finish) {
                runs.push(run);
            }
            continue;
        }

        if ch.ch.is_whitespace() {
            if let Some(run) = current.as_mut() {
                run.pending_space = true;
            }
            continue;
        }

        match current.as_mut() {
            Some(run) if !run.breaks_at(ch) => run.push(ch),
            _ => {
                if let Some(run) = current.take().and_then(RunBuilder::finish) {
                    runs.push(run);
                }
                current = Some(RunBuilder::start(ch));
            }
        }
    }

    if let Some(run) = current.and_then(RunBuilder::finish) {
        runs.push(run);
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_char(ch: char, x: f32, y: f32) -> PdfChar {
        PdfChar {
            ch,
            x,
            y,
            width: 5.0,
            height: 8.0,
            font_size: 10.0,
            page: 0,
        }
    }

    fn make_word(word: &str, x_start: f32, y: f32) -> Vec<PdfChar> {
        word.chars()
            .enumerate()
            .map(|(i, ch)| make_char(ch, x_start + i as f32 * 5.0, y))
            .collect()
    }

    #[test]
    fn group_runs_empty() {
        assert!(group_runs(&[]).is_empty());
    }

    #[test]
    fn group_runs_joins_words_with_spaces() {
        let mut chars = make_word("Data", 10.0, 100.0);
        chars.push(make_char(' ', 30.0, 100.0));
        chars.extend(make_word("Mining", 35.0, 100.0));

        let runs = group_runs(&chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Data Mining");
        assert!((runs[0].x - 10.0).abs() < f32::EPSILON);
        assert!((runs[0].width - 55.0).abs() < f32::EPSILON);
    }

    #[test]
    fn group_runs_splits_on_wide_gap() {
        let mut chars = make_word("Physics", 10.0, 100.0);
        chars.extend(make_word("Chemistry", 200.0, 100.0));

        let runs = group_runs(&chars);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "Chemistry");
    }

    #[test]
    fn group_runs_splits_on_baseline_shift() {
        let mut chars = make_word("Physics", 10.0, 100.0);
        chars.extend(make_word("HF09", 45.0, 88.0));

        let runs = group_runs(&chars);
        assert_eq!(runs.len(), 2);
        assert!((runs[1].y - 88.0).abs() < f32::EPSILON);
    }

    #[test]
    fn group_runs_splits_on_newline_and_drops_blank() {
        let mut chars = make_word("A1", 10.0, 100.0);
        chars.push(make_char('\n', 0.0, 0.0));
        chars.push(make_char(' ', 0.0, 0.0));
        chars.extend(make_word("B2", 20.0, 100.0));

        let texts: Vec<_> = group_runs(&chars).into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["A1", "B2"]);
    }

    #[test]
    fn group_runs_rounds_coordinates() {
        let chars = vec![PdfChar {
            ch: 'X',
            x: 10.04,
            y: 99.96,
            width: 5.123,
            height: 8.0,
            font_size: 9.87,
            page: 0,
        }];
        let run = &group_runs(&chars)[0];
        assert!((run.x - 10.0).abs() < 1e-4);
        assert!((run.y - 100.0).abs() < 1e-4);
        assert!((run.width - 5.1).abs() < 1e-4);
        assert!((run.font_size - 9.9).abs() < 1e-4);
    }

    #[test]
    fn group_runs_separates_pages() {
        let mut chars = make_word("AB", 10.0, 100.0);
        chars.extend(make_word("CD", 20.0, 100.0).into_iter().map(|mut c| {
            c.page = 1;
            c
        }));
        assert_eq!(group_runs(&chars).len(), 2);
    }
}
