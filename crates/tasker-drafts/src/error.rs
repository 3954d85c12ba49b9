//! Error types for draft operations.

use tasker_core::{FetchError, GridError, ImportError};
use thiserror::Error;

/// Errors that can occur while adding or changing task drafts.
#[derive(Error, Debug)]
pub enum DraftError {
    /// No draft with this id.
    #[error("task draft not found: {0}")]
    NotFound(String),

    /// No supported format recognised the payload.
    #[error("payload format not recognised")]
    UnrecognizedPayload,

    /// Input produced no polygon that could become a draft.
    #[error("no usable polygon geometry found")]
    NoUsableGeometry,

    /// Subdivision parameters were rejected.
    #[error("invalid subdivision input: {0}")]
    InvalidBatchInput(#[from] GridError),

    /// Remote payload could not be loaded.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Project export could not be read.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for draft operations.
pub type Result<T> = std::result::Result<T, DraftError>;
