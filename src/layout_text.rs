//! Plain-text page reconstruction for the refinement prompt.
//!
//! Runs are grouped into visual lines by baseline proximity, and every run is
//! tagged with its x position so the completion service can still see the
//! column structure:
//!
//! ```text
//! [x:20] Monday | [x:100] Physics | [x:200] Chemistry
//! [x:100] HF09
//! ```

use crate::model::PositionedText;

const SEPARATOR: &str = " | ";

/// Group runs into lines, top of page first, each line sorted left to right.
pub fn group_lines(runs: &[PositionedText], tolerance: f32) -> Vec<Vec<&PositionedText>> {
    let mut sorted: Vec<&PositionedText> = runs.iter().collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<(f32, Vec<&PositionedText>)> = Vec::new();
    for run in sorted {
        let joins = lines
            .last()
            .is_some_and(|(line_y, _)| (line_y - run.y).abs() <= tolerance);
        if let (true, Some((_, line))) = (joins, lines.last_mut()) {
            line.push(run);
        } else {
            lines.push((run.y, vec![run]));
        }
    }

    lines
        .into_iter()
        .map(|(_, mut line)| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            line
        })
        .collect()
}

/// Render runs as x-tagged lines joined top to bottom.
pub fn render(runs: &[PositionedText], tolerance: f32) -> String {
    group_lines(runs, tolerance)
        .iter()
        .map(|line| {
            line.iter()
                .map(|run| format!("[x:{:.0}] {}", run.x, run.text))
                .collect::<Vec<_>>()
                .join(SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
