//! Mapping text runs into `(day, period)` cells.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{day_labels, ColumnBand, RowBand, PERIOD_MARKER};
use crate::config::LayoutConfig;
use crate::model::{Day, PositionedText};

/// Page furniture that never belongs to a class entry.
static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            page\s*\d+(?:\s*(?:of|/)\s*\d+)?
          | (?:printed|generated|created|published)\s+(?:on|by|at)\b.*
          | time\s*-?\s*tables?\b.*
          | class\s+schedules?\b.*
          | academic\s+(?:year|session)\b.*
          | (?:spring|summer|fall|autumn|winter)\s+(?:semester\s+)?\d{4}.*
          | semester\s*[:\-]?\s*\d.*
          | (?:https?://|www\.).*
          | (?:©|\(c\)|copyright).*
          | day\s*/\s*(?:time|period)
          | (?:days?|time|periods?)
        )$",
    )
    .unwrap()
});

/// A bare time (`08:00`) or time range (`08:00 - 08:50`).
static TIME_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}[:.]\d{2}(?:\s*(?:-|–|—|to)\s*\d{1,2}[:.]\d{2})?$").unwrap()
});

/// Runs that fell inside one `(day, period)` band pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub day: Day,
    /// Zero-based index into the slot table.
    pub period_index: usize,
    pub texts: Vec<PositionedText>,
}

/// Whether a run is grid furniture rather than cell content.
pub fn is_noise(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() <= 1
        || PERIOD_MARKER.is_match(text)
        || TIME_TEXT.is_match(text)
        || BOILERPLATE.is_match(text)
}

/// Right edge of the day-label column minus `tolerance`.
///
/// Anything starting left of this is label gutter. Without day labels the
/// gutter is unbounded on the left.
pub fn label_gutter(runs: &[PositionedText], tolerance: f32) -> f32 {
    day_labels(runs)
        .map(|(_, run)| run.right())
        .fold(f32::NEG_INFINITY, f32::max)
        - tolerance
}

/// Assign every content run to the unique row and column containing it.
///
/// Header runs, day labels, gutter runs and noise are skipped; runs outside
/// every band are dropped silently. Cells come back ordered by day, then
/// period.
pub fn map_cells(
    runs: &[PositionedText],
    rows: &[RowBand],
    columns: &[ColumnBand],
    layout: &LayoutConfig,
) -> Vec<Cell> {
    let Some(first_row) = rows.first() else {
        return Vec::new();
    };
    let header_top = first_row.top;
    let gutter = label_gutter(runs, layout.gutter_tolerance);

    let mut cells: BTreeMap<(Day, usize), Vec<PositionedText>> = BTreeMap::new();
    let mut dropped = 0usize;

    for run in runs {
        if run.y > header_top
            || Day::from_label(&run.text).is_some()
            || run.x < gutter
            || is_noise(&run.text)
        {
            continue;
        }

        let row = rows.iter().find(|row| row.contains(run.y));
        let column = columns.iter().find(|column| column.contains(run.x));
        match (row, column) {
            (Some(row), Some(column)) => cells
                .entry((row.day, column.period_index))
                .or_default()
                .push(run.clone()),
            _ => dropped += 1,
        }
    }

    debug!(
        "Mapped runs into {} cells ({} runs outside every band)",
        cells.len(),
        dropped
    );

    cells
        .into_iter()
        .map(|((day, period_index), texts)| Cell {
            day,
            period_index,
            texts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x: f32, y: f32) -> PositionedText {
        PositionedText::new(text, x, y, 40.0, 10.0)
    }

    fn rows() -> Vec<RowBand> {
        vec![
            RowBand {
                day: Day::Monday,
                top: 535.0,
                bottom: 435.0,
            },
            RowBand {
                day: Day::Tuesday,
                top: 435.0,
                bottom: f32::NEG_INFINITY,
            },
        ]
    }

    fn columns() -> Vec<ColumnBand> {
        vec![
            ColumnBand {
                left: 92.0,
                right: 192.0,
                period_index: 0,
                start_time: "08:00".into(),
                end_time: "08:50".into(),
            },
            ColumnBand {
                left: 192.0,
                right: f32::INFINITY,
                period_index: 1,
                start_time: "09:00".into(),
                end_time: "09:50".into(),
            },
        ]
    }

    #[test]
    fn noise_classifier() {
        assert!(is_noise("A"));
        assert!(is_noise("3."));
        assert!(is_noise("08:00"));
        assert!(is_noise("08:00 - 08:50"));
        assert!(is_noise("Page 2 of 3"));
        assert!(is_noise("Generated on 2024-01-01"));
        assert!(is_noise("Fall 2024 Timetable"));
        assert!(is_noise("Time Table"));
        assert!(!is_noise("Mathematics"));
        assert!(!is_noise("HF09"));
        assert!(!is_noise("Semantics"));
    }

    #[test]
    fn maps_runs_into_cells() {
        let runs = vec![
            run("Monday", 20.0, 500.0),
            run("Tuesday", 20.0, 400.0),
            run("Physics", 100.0, 510.0),
            run("HF09", 100.0, 498.0),
            run("Chemistry", 250.0, 390.0),
        ];
        let cells = map_cells(&runs, &rows(), &columns(), &LayoutConfig::default());

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].day, Day::Monday);
        assert_eq!(cells[0].period_index, 0);
        assert_eq!(cells[0].texts.len(), 2);
        assert_eq!(cells[1].day, Day::Tuesday);
        assert_eq!(cells[1].period_index, 1);
        assert_eq!(cells[1].texts[0].text, "Chemistry");
    }

    #[test]
    fn skips_header_gutter_and_noise() {
        let runs = vec![
            run("Monday", 20.0, 500.0),
            run("Header Title", 100.0, 600.0),
            run("Note", 30.0, 480.0),
            run("3.", 100.0, 480.0),
            run("Algebra", 100.0, 470.0),
        ];
        let cells = map_cells(&runs, &rows(), &columns(), &LayoutConfig::default());
        assert_eq!(cells.len(), 1);
        let texts: Vec<_> = cells[0].texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Algebra"]);
    }

    #[test]
    fn gutter_is_label_right_edge_minus_tolerance() {
        let runs = vec![run("Monday", 20.0, 500.0), run("Wednesday", 10.0, 300.0)];
        assert!((label_gutter(&runs, 10.0) - 50.0).abs() < f32::EPSILON);
        assert_eq!(label_gutter(&[], 10.0), f32::NEG_INFINITY);
    }

    #[test]
    fn runs_left_of_every_column_are_dropped() {
        let runs = vec![run("Monday", 0.0, 500.0), run("Stray", 35.0, 480.0)];
        let cells = map_cells(&runs, &rows(), &columns(), &LayoutConfig::default());
        assert!(cells.is_empty());
    }
}
