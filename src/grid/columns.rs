//! Period-column detection.
//!
//! Strategies, in order of preference:
//!
//! 1. **Period markers** (`1.`, `2.`, ...) in the header, used when at least
//!    `min_period_markers` are present. Marker `N` is slot table entry `N - 1`.
//! 2. **Time labels** (`08:00`, `08:00-08:50`), deduplicated by x proximity.
//! 3. **Even division** of the page width right of the day-label column.
//!
//! A strategy is abandoned if it yields fewer than two anchors.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{ColumnBand, RowBand, PERIOD_MARKER};
use crate::config::LayoutConfig;
use crate::model::PositionedText;
use crate::slots::SlotTable;

/// A whole run that is a time (`08:00`) or range (`08:00 - 08:50`); captures the start.
static TIME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}:\d{2})(?:\s*(?:-|–|—|to)\s*\d{1,2}[:.]\d{2})?\s*$").unwrap()
});

/// How the column anchors were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStrategy {
    PeriodMarkers,
    TimeLabels,
    EvenDivision,
}

/// Detected columns plus the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub strategy: ColumnStrategy,
    pub bands: Vec<ColumnBand>,
}

/// `(anchor x, slot index)` pairs, ascending in both.
type Anchors = Vec<(f32, usize)>;

/// Derive column bands from the header zone above the first day row.
pub fn detect_columns(
    runs: &[PositionedText],
    rows: &[RowBand],
    slots: &SlotTable,
    layout: &LayoutConfig,
) -> ColumnLayout {
    let header_top = rows.first().map_or(f32::INFINITY, |row| row.top);
    let header: Vec<&PositionedText> = runs.iter().filter(|run| run.y > header_top).collect();

    let (strategy, anchors) = if let Some(anchors) = period_marker_anchors(&header, slots, layout) {
        (ColumnStrategy::PeriodMarkers, anchors)
    } else if let Some(anchors) = time_label_anchors(&header, slots, layout) {
        (ColumnStrategy::TimeLabels, anchors)
    } else {
        (ColumnStrategy::EvenDivision, even_anchors(runs, slots, layout))
    };

    let bands = bands_from_anchors(&anchors, slots, layout.column_shift);
    debug!(
        "Detected {} period columns via {:?} from {} header runs",
        bands.len(),
        strategy,
        header.len()
    );

    ColumnLayout { strategy, bands }
}

fn sort_by_x(runs: &mut [&PositionedText]) {
    runs.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(b.y.total_cmp(&a.y))
            .then_with(|| a.text.cmp(&b.text))
    });
}

/// Keep anchors whose slot index strictly increases left to right.
fn monotonic(candidates: impl IntoIterator<Item = (f32, usize)>) -> Anchors {
    let mut anchors: Anchors = Vec::new();
    for (x, idx) in candidates {
        if anchors.last().map_or(true, |&(_, last)| idx > last) {
            anchors.push((x, idx));
        }
    }
    anchors
}

fn period_marker_anchors(
    header: &[&PositionedText],
    slots: &SlotTable,
    layout: &LayoutConfig,
) -> Option<Anchors> {
    let mut markers: Vec<&PositionedText> = header
        .iter()
        .copied()
        .filter(|run| PERIOD_MARKER.is_match(run.text.trim()))
        .collect();
    if markers.len() < layout.min_period_markers {
        return None;
    }
    sort_by_x(&mut markers);

    let anchors = monotonic(markers.iter().filter_map(|run| {
        let caps = PERIOD_MARKER.captures(run.text.trim())?;
        let period: usize = caps[1].parse().ok()?;
        (1..=slots.len()).contains(&period).then(|| (run.x, period - 1))
    }));

    (anchors.len() >= 2).then_some(anchors)
}

fn time_label_anchors(
    header: &[&PositionedText],
    slots: &SlotTable,
    layout: &LayoutConfig,
) -> Option<Anchors> {
    let mut labelled: Vec<&PositionedText> = header
        .iter()
        .copied()
        .filter(|run| TIME_LABEL.is_match(&run.text))
        .collect();
    sort_by_x(&mut labelled);

    let mut deduped: Vec<(f32, String)> = Vec::new();
    for run in labelled {
        let too_close = deduped
            .last()
            .is_some_and(|(x, _)| run.x - x < layout.anchor_dedup_tolerance);
        if too_close {
            continue;
        }
        if let Some(caps) = TIME_LABEL.captures(&run.text) {
            deduped.push((run.x, caps[1].to_string()));
        }
    }

    // Headers that print both start and end as separate runs: when any label
    // is an exact slot start, only exact starts are anchors.
    let exact: Vec<(f32, usize)> = deduped
        .iter()
        .filter_map(|(x, time)| exact_start_index(slots, time).map(|idx| (*x, idx)))
        .collect();
    let candidates = if exact.is_empty() {
        deduped
            .iter()
            .filter_map(|(x, time)| slots.nearest_index(time).map(|idx| (*x, idx)))
            .collect()
    } else {
        exact
    };

    let anchors = monotonic(candidates);
    (anchors.len() >= 2).then_some(anchors)
}

fn exact_start_index(slots: &SlotTable, time: &str) -> Option<usize> {
    let normalized = crate::slots::normalize_time(time)?;
    slots.iter().position(|slot| slot.start == normalized)
}

fn even_anchors(runs: &[PositionedText], slots: &SlotTable, layout: &LayoutConfig) -> Anchors {
    let page_left = runs.iter().map(|run| run.x).fold(f32::INFINITY, f32::min);
    let page_right = runs
        .iter()
        .map(PositionedText::right)
        .fold(f32::NEG_INFINITY, f32::max);
    if !page_left.is_finite() || !page_right.is_finite() {
        return Vec::new();
    }

    let left = page_left + layout.day_column_width;
    let step = ((page_right - left) / slots.len() as f32).max(1.0);
    (0..slots.len())
        .map(|idx| (left + step * idx as f32, idx))
        .collect()
}

/// Turn anchors into contiguous bands, capped at the slot table size.
fn bands_from_anchors(anchors: &[(f32, usize)], slots: &SlotTable, shift: f32) -> Vec<ColumnBand> {
    let anchors = &anchors[..anchors.len().min(slots.len())];
    let lefts: Vec<f32> = anchors.iter().map(|&(x, _)| x - shift).collect();

    anchors
        .iter()
        .enumerate()
        .filter_map(|(pos, &(_, idx))| {
            let slot = slots.get(idx)?;
            Some(ColumnBand {
                left: lefts[pos],
                right: lefts.get(pos + 1).copied().unwrap_or(f32::INFINITY),
                period_index: idx,
                start_time: slot.start.clone(),
                end_time: slot.end.clone(),
            })
        })
        .collect()
}
