//! Canonical institution time slots.
//!
//! The slot table is configuration, not something discovered per document:
//! a numeric period header `N.` always means table entry `N - 1`, and any
//! time value that leaves the pipeline is forced onto one of these pairs.

use serde::{Deserialize, Serialize};

/// One `(start, end)` period, both zero-padded `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Ordered, non-empty list of [`TimeSlot`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<TimeSlot>,
}

impl SlotTable {
    /// Build a table, normalizing every time to `HH:MM`.
    ///
    /// Returns the offending value if a time cannot be parsed.
    pub fn new(slots: Vec<TimeSlot>) -> Result<Self, String> {
        if slots.is_empty() {
            return Err("slot table is empty".to_string());
        }
        let mut normalized = Vec::with_capacity(slots.len());
        for slot in slots {
            let start = normalize_time(&slot.start).ok_or_else(|| slot.start.clone())?;
            let end = normalize_time(&slot.end).ok_or_else(|| slot.end.clone())?;
            normalized.push(TimeSlot { start, end });
        }
        Ok(Self { slots: normalized })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Index of the slot whose start is nearest to `time`.
    ///
    /// An exact start match wins; otherwise the smallest distance in
    /// minutes-since-midnight, earlier slot on ties.
    pub fn nearest_index(&self, time: &str) -> Option<usize> {
        let minutes = parse_minutes(time)?;
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| parse_minutes(&slot.start).map(|start| (idx, start)))
            .min_by_key(|&(idx, start)| (start.abs_diff(minutes), idx))
            .map(|(idx, _)| idx)
    }

    /// Snap an arbitrary start time to its canonical slot.
    pub fn snap(&self, time: &str) -> Option<&TimeSlot> {
        self.nearest_index(time).and_then(|idx| self.slots.get(idx))
    }

    /// Whether `(start, end)` is exactly one of the table's pairs.
    pub fn contains_pair(&self, start: &str, end: &str) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.start == start && slot.end == end)
    }
}

impl Default for SlotTable {
    /// Nine 50-minute periods on the hour, 08:00 through 16:50.
    fn default() -> Self {
        let slots = (8..17)
            .map(|hour| TimeSlot::new(format!("{hour:02}:00"), format!("{hour:02}:50")))
            .collect();
        Self { slots }
    }
}

/// Parse `H:MM`, `HH:MM` or `HH.MM` into minutes since midnight.
pub fn parse_minutes(time: &str) -> Option<u32> {
    let time = time.trim();
    let (hours, minutes) = time.split_once([':', '.'])?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Normalize a time string to zero-padded `HH:MM`.
pub fn normalize_time(time: &str) -> Option<String> {
    parse_minutes(time).map(|total| format!("{:02}:{:02}", total / 60, total % 60))
}
