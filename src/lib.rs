//! `timegrid` - grid timetable extraction from text PDFs
//!
//! # Features
//!
//! - **Geometric grid recovery**: day rows and period columns inferred from
//!   positioned text, no table markup required
//! - **Heuristic classification**: ordered pattern rules split each cell into
//!   subject, teacher, room, block and class
//! - **Optional refinement**: an OpenAI-compatible completion service may
//!   correct fields, with times always snapped back to the slot table
//! - **Validation**: canonical days, zero-padded times, one entry per slot
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timegrid::{ParserConfig, TimetableParser};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ParserConfig::load(None)?);
//!     let parser = TimetableParser::from_config(config);
//!     let bytes = std::fs::read("timetable.pdf")?;
//!     let result = parser.parse_pdf(bytes).await?;
//!     println!("{} entries", result.final_entry_count);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod layout_text;
pub mod model;
pub mod pipeline;
pub mod refine;
pub mod slots;
pub mod validate;

pub use config::ParserConfig;
pub use error::{ParseError, RefineError};
pub use model::{Day, ExtractionResult, PositionedText, ScheduleEntry};
pub use pipeline::{HeuristicPass, TimetableParser};
pub use refine::{CompletionRefiner, PassthroughRefiner, Refiner};
pub use slots::{SlotTable, TimeSlot};
pub use validate::validate_and_merge;

/// Version of timegrid
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
