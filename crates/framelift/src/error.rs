//! Error types for framelift operations.
//!
//! Only failures that occur before a replacement run starts are errors in
//! the `Result` sense: I/O, malformed configuration, unknown mapping ids.
//! Per-node failures during a run never propagate; they are recorded as
//! skip entries in the [`ReplaceSummary`](crate::ReplaceSummary) and logged.

use std::io;

use thiserror::Error;

use framelift_core::document::DocumentError;

/// The main error type for framelift operations.
#[derive(Debug, Error)]
pub enum FrameliftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("unknown mapping id `{0}`")]
    UnknownMapping(String),

    #[error("configuration error: {0}")]
    Config(String),
}
