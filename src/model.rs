//! Core data types shared by every pipeline stage.
//!
//! ```text
//! PositionedText ─► RowBand/ColumnBand ─► Cell ─► ScheduleEntry ─► ExtractionResult
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single text run recovered from the document.
///
/// Coordinates are PDF points with `y` increasing upward, rounded to one
/// decimal place at extraction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedText {
    pub text: String,
    /// Left edge of the run.
    pub x: f32,
    /// Baseline of the run.
    pub y: f32,
    pub width: f32,
    #[serde(default)]
    pub font_size: f32,
}

impl PositionedText {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge of the run.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Canonical weekday, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Canonical capitalized name, e.g. `"Monday"`.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Exact, case-insensitive match against the full day name.
    pub fn from_label(text: &str) -> Option<Day> {
        let lower = text.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| day.name().to_lowercase() == lower)
    }

    /// Exact match first, then a match on the first three letters
    /// (`"Wed"`, `"Thurs"`, `"mondy"`).
    pub fn from_fuzzy(text: &str) -> Option<Day> {
        if let Some(day) = Day::from_label(text) {
            return Some(day);
        }
        let prefix: String = text.trim().to_lowercase().chars().take(3).collect();
        if prefix.chars().count() < 3 {
            return None;
        }
        Day::ALL
            .into_iter()
            .find(|day| day.name().to_lowercase().starts_with(&prefix))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recovered class meeting.
///
/// `subject` is required by validation; every other field defaults to an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleEntry {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub block: String,
    pub class_name: String,
}

impl ScheduleEntry {
    /// The `(day, start_time, end_time)` slot this entry occupies.
    pub fn slot_key(&self) -> (String, String, String) {
        (
            self.day.clone(),
            self.start_time.clone(),
            self.end_time.clone(),
        )
    }
}

/// Final pipeline output handed to the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub entries: Vec<ScheduleEntry>,
    pub errors: Vec<String>,
    /// Number of populated `(day, period)` cells found on the grid.
    pub raw_cell_count: usize,
    pub final_entry_count: usize,
}

impl ExtractionResult {
    pub fn new(entries: Vec<ScheduleEntry>, errors: Vec<String>, raw_cell_count: usize) -> Self {
        let final_entry_count = entries.len();
        Self {
            entries,
            errors,
            raw_cell_count,
            final_entry_count,
        }
    }
}
