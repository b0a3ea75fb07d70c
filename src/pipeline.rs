//! End-to-end timetable parsing.
//!
//! ```text
//! bytes ─► runs ─► rows ─► columns ─► cells ─► entries ─► refine ─► validate
//! ```
//!
//! Every stage but refinement is synchronous and deterministic. A parser holds
//! no per-document state, so one instance can serve concurrent documents.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::grid::{detect_columns, detect_rows, map_cells, ColumnStrategy};
use crate::layout_text;
use crate::model::{ExtractionResult, PositionedText, ScheduleEntry};
use crate::refine::{self, CompletionRefiner, PassthroughRefiner, Refiner};
use crate::validate::validate_and_merge;

/// Output of the geometric and heuristic stages.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicPass {
    pub entries: Vec<ScheduleEntry>,
    /// Populated `(day, period)` cells.
    pub raw_cell_count: usize,
    pub row_count: usize,
    pub column_strategy: ColumnStrategy,
}

/// Timetable parser bound to one configuration and one refiner.
pub struct TimetableParser {
    config: Arc<ParserConfig>,
    classifier: Classifier,
    refiner: Box<dyn Refiner>,
    timeout: Duration,
}

impl TimetableParser {
    /// Parser with the passthrough refiner.
    pub fn new(config: Arc<ParserConfig>) -> Self {
        Self {
            classifier: Classifier::new(&config.lexicon, &config.layout),
            refiner: Box::new(PassthroughRefiner),
            timeout: config.refine.timeout(),
            config,
        }
    }

    /// Parser that refines through the completion service when refinement is
    /// enabled and a credential is available.
    pub fn from_config(config: Arc<ParserConfig>) -> Self {
        let Some(api_key) = config.refine.api_key() else {
            debug!(
                "Refinement disabled or {} unset; using passthrough",
                config.refine.api_key_env
            );
            return Self::new(config);
        };
        match CompletionRefiner::new(&config.refine, Some(api_key)) {
            Ok(refiner) => Self::new(config).with_refiner(refiner),
            Err(e) => {
                warn!("Could not build completion client, refinement disabled: {e}");
                Self::new(config)
            }
        }
    }

    #[must_use]
    pub fn with_refiner(mut self, refiner: impl Refiner + 'static) -> Self {
        self.refiner = Box::new(refiner);
        self
    }

    /// Override the refinement timeout from the configuration.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn refiner_name(&self) -> &'static str {
        self.refiner.name()
    }

    /// Decode a PDF on the blocking pool and parse its runs.
    #[cfg(feature = "pdf")]
    pub async fn parse_pdf(&self, bytes: Vec<u8>) -> Result<ExtractionResult, ParseError> {
        let runs = tokio::task::spawn_blocking(move || crate::extract::extract_runs(&bytes))
            .await
            .map_err(|e| ParseError::Join(e.to_string()))??;
        self.parse_runs(runs).await
    }

    /// Parse already-extracted runs.
    pub async fn parse_runs(&self, runs: Vec<PositionedText>) -> Result<ExtractionResult, ParseError> {
        if runs.is_empty() {
            return Err(ParseError::NoTextFound);
        }
        info!("Parsing timetable from {} text runs", runs.len());

        let pass = self.heuristic_pass(&runs)?;
        let raw_text = layout_text::render(&runs, self.config.layout.line_tolerance);

        let entries = refine::refine_or_fallback(
            self.refiner.as_ref(),
            pass.entries,
            &raw_text,
            &self.config.slots,
            self.timeout,
        )
        .await;

        let (entries, mut errors) = validate_and_merge(entries);
        if entries.is_empty() && errors.is_empty() {
            errors.push(format!(
                "No class entries recognized in {} populated grid cells",
                pass.raw_cell_count
            ));
        }

        let result = ExtractionResult::new(entries, errors, pass.raw_cell_count);
        info!(
            "Extracted {} entries from {} cells ({} errors)",
            result.final_entry_count,
            result.raw_cell_count,
            result.errors.len()
        );
        Ok(result)
    }

    /// Rows, columns, cells and classification.
    pub fn heuristic_pass(&self, runs: &[PositionedText]) -> Result<HeuristicPass, ParseError> {
        let config = &self.config;
        let rows = detect_rows(runs, &config.layout)?;
        let columns = detect_columns(runs, &rows, &config.slots, &config.layout);
        let cells = map_cells(runs, &rows, &columns.bands, &config.layout);
        let entries = self.classifier.classify_cells(&cells, &config.slots);

        info!(
            "Grid: {} rows, {} columns ({:?}), {} cells, {} heuristic entries",
            rows.len(),
            columns.bands.len(),
            columns.strategy,
            cells.len(),
            entries.len()
        );

        Ok(HeuristicPass {
            entries,
            raw_cell_count: cells.len(),
            row_count: rows.len(),
            column_strategy: columns.strategy,
        })
    }
}
