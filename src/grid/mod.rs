//! Geometric grid recovery from positioned text.
//!
//! The timetable is treated as a two-axis interval partition:
//!
//! 1. Day labels define horizontal [`RowBand`]s (descending y)
//! 2. Header markers define vertical [`ColumnBand`]s (ascending x)
//! 3. Every remaining run is dropped into the unique band pair containing it
//!
//! Bands are sorted, non-overlapping, and the outermost band on each axis is
//! closed by an infinite sentinel, so containment is two comparisons.

pub mod cells;
pub mod columns;
pub mod rows;

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Day, PositionedText};

pub use cells::{label_gutter, map_cells, Cell};
pub use columns::{detect_columns, ColumnLayout, ColumnStrategy};
pub use rows::detect_rows;

/// Numeric period header such as `3.` or `10.`.
pub(crate) static PERIOD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.$").unwrap());

/// One day-row of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBand {
    pub day: Day,
    /// Inclusive upper edge.
    pub top: f32,
    /// Exclusive lower edge; `f32::NEG_INFINITY` for the last row.
    pub bottom: f32,
}

impl RowBand {
    pub fn contains(&self, y: f32) -> bool {
        y <= self.top && y > self.bottom
    }
}

/// One period-column of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBand {
    /// Inclusive left edge.
    pub left: f32,
    /// Exclusive right edge; `f32::INFINITY` for the last column.
    pub right: f32,
    /// Zero-based index into the slot table.
    pub period_index: usize,
    pub start_time: String,
    pub end_time: String,
}

impl ColumnBand {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x < self.right
    }
}

/// Runs whose text is exactly a day name.
pub(crate) fn day_labels(runs: &[PositionedText]) -> impl Iterator<Item = (Day, &PositionedText)> {
    runs.iter()
        .filter_map(|run| Day::from_label(&run.text).map(|day| (day, run)))
}
