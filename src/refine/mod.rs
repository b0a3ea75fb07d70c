//! Optional refinement of heuristic entries by a completion service.
//!
//! # Architecture
//!
//! - [`Refiner`]: async capability that rewrites an entry list given the
//!   reconstructed page text
//! - [`PassthroughRefiner`]: local no-op used without a credential and in tests
//! - [`CompletionRefiner`]: OpenAI-compatible chat-completions client
//!
//! Whatever a refiner returns passes two guards before it is used: the
//! acceptance gate ([`accept`]) and the time re-snap ([`resnap`]). A refiner
//! can reword fields and recover entries, but it can never move a class to a
//! time that is not in the slot table.

pub mod completion;
pub mod response;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::RefineError;
use crate::model::ScheduleEntry;
use crate::slots::SlotTable;

pub use completion::CompletionRefiner;
pub use response::parse_entries;

/// Rewrites heuristic entries using external knowledge.
#[async_trait]
pub trait Refiner: Send + Sync {
    /// Refiner name for diagnostics (e.g. "passthrough", "completion").
    fn name(&self) -> &'static str;

    /// Return a corrected entry list for the page described by `raw_text`.
    async fn refine(
        &self,
        entries: &[ScheduleEntry],
        raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError>;
}

/// Returns the heuristic entries unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRefiner;

#[async_trait]
impl Refiner for PassthroughRefiner {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn refine(
        &self,
        entries: &[ScheduleEntry],
        _raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError> {
        Ok(entries.to_vec())
    }
}

/// Acceptance gate: a refined list shorter than half the heuristic list is
/// treated as truncated and rejected.
pub fn accept(heuristic: &[ScheduleEntry], refined: Vec<ScheduleEntry>) -> Option<Vec<ScheduleEntry>> {
    (refined.len() * 2 >= heuristic.len()).then_some(refined)
}

/// Force every entry onto the slot nearest its start time.
///
/// The end time is always replaced by that slot's end. Entries whose start
/// time cannot be read are dropped.
pub fn resnap(entries: Vec<ScheduleEntry>, slots: &SlotTable) -> Vec<ScheduleEntry> {
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let Some(slot) = slots.snap(&entry.start_time) else {
                debug!(
                    "Dropping refined entry {:?} with unreadable start time {:?}",
                    entry.subject, entry.start_time
                );
                return None;
            };
            entry.start_time.clone_from(&slot.start);
            entry.end_time.clone_from(&slot.end);
            Some(entry)
        })
        .collect()
}

/// Run `refiner` under `timeout`, returning the heuristic entries on any
/// failure or rejection.
///
/// Refined entries are snapped before the acceptance gate runs.
pub async fn refine_or_fallback(
    refiner: &dyn Refiner,
    heuristic: Vec<ScheduleEntry>,
    raw_text: &str,
    slots: &SlotTable,
    timeout: Duration,
) -> Vec<ScheduleEntry> {
    let outcome = match tokio::time::timeout(timeout, refiner.refine(&heuristic, raw_text)).await {
        Ok(result) => result,
        Err(_) => Err(RefineError::Timeout(timeout.as_secs())),
    };

    let refined = match outcome {
        Ok(refined) => refined,
        Err(e) => {
            warn!("{} refinement failed, keeping heuristic entries: {e}", refiner.name());
            return heuristic;
        }
    };

    // Gate on the snapped list; unplaceable entries do not count.
    let refined_len = refined.len();
    let snapped = resnap(refined, slots);
    let snapped_len = snapped.len();
    let Some(accepted) = accept(&heuristic, snapped) else {
        warn!(
            "{} refinement returned {} entries ({} placeable) for {} heuristic entries; keeping heuristic entries",
            refiner.name(),
            refined_len,
            snapped_len,
            heuristic.len()
        );
        return heuristic;
    };

    info!(
        "{} refinement accepted: {} heuristic → {} refined entries",
        refiner.name(),
        heuristic.len(),
        accepted.len()
    );
    accepted
}
