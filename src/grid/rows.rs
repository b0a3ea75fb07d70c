//! Day-row detection.

use tracing::debug;

use super::{day_labels, RowBand};
use crate::config::LayoutConfig;
use crate::error::ParseError;
use crate::model::{Day, PositionedText};

/// Derive one [`RowBand`] per distinct day label, top of page first.
///
/// Labels for the same day within `day_dedup_tolerance` of each other are
/// one label; the first in sort order wins. Each band spans from
/// `label.y + row_padding` down to the next band's top.
pub fn detect_rows(
    runs: &[PositionedText],
    layout: &LayoutConfig,
) -> Result<Vec<RowBand>, ParseError> {
    let mut labels: Vec<(Day, f32, f32)> = day_labels(runs)
        .map(|(day, run)| (day, run.y, run.x))
        .collect();

    labels.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then(a.2.total_cmp(&b.2))
            .then(a.0.cmp(&b.0))
    });

    let mut kept: Vec<(Day, f32)> = Vec::with_capacity(labels.len());
    for (day, y, _) in labels {
        let duplicate = kept
            .iter()
            .any(|&(kept_day, kept_y)| kept_day == day && (kept_y - y).abs() <= layout.day_dedup_tolerance);
        if !duplicate {
            kept.push((day, y));
        }
    }

    if kept.is_empty() {
        return Err(ParseError::NoDayLabelsFound);
    }

    let tops: Vec<f32> = kept.iter().map(|&(_, y)| y + layout.row_padding).collect();
    let bands: Vec<RowBand> = kept
        .iter()
        .enumerate()
        .map(|(idx, &(day, _))| RowBand {
            day,
            top: tops[idx],
            bottom: tops.get(idx + 1).copied().unwrap_or(f32::NEG_INFINITY),
        })
        .collect();

    debug!(
        "Detected {} day rows: {:?}",
        bands.len(),
        bands.iter().map(|b| b.day).collect::<Vec<_>>()
    );

    Ok(bands)
}
