//! Error types.
//!
//! [`ParseError`] rejects a document outright. [`RefineError`] never leaves
//! the pipeline: refinement failures fall back to the heuristic entries.

use thiserror::Error;

/// Fatal, input-level rejections. No partial entries accompany these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not decode document: {0}")]
    Extraction(String),

    #[error(
        "No text found in document. It is probably a scanned or image-only PDF; \
         export the timetable as a text PDF and try again"
    )]
    NoTextFound,

    #[error("No day labels found. The document does not look like a grid timetable")]
    NoDayLabelsFound,

    #[error("Extraction task failed: {0}")]
    Join(String),
}

/// Failures of the optional refinement pass.
#[derive(Error, Debug)]
pub enum RefineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unparseable completion: {0}")]
    Parse(String),

    #[error("Completion contained no text")]
    EmptyResponse,

    #[error("Refinement timed out after {0}s")]
    Timeout(u64),
}

impl From<serde_json::Error> for RefineError {
    fn from(err: serde_json::Error) -> Self {
        RefineError::Parse(err.to_string())
    }
}
