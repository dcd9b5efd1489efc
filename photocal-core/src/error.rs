//! Error types for photocal.

use thiserror::Error;

/// Errors that can occur in photocal operations.
#[derive(Error, Debug)]
pub enum PhotocalError {
    #[error("An API key is required before a photo can be analyzed")]
    CredentialMissing,

    #[error("Vision API error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("Vision API request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Could not encode image: {0}")]
    Encoding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vision API request timed out after {0}s")]
    Timeout(u64),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Another photo is already being analyzed")]
    Busy,

    #[error("An extracted event is waiting for review; save or discard it first")]
    PendingUnresolved,

    #[error("No extracted event is waiting for review")]
    NothingPending,

    #[error("Event '{0}' is not the event waiting for review")]
    PendingMismatch(String),

    #[error("Invalid event: {0}")]
    InvalidRecord(String),

    #[error("An event with id '{0}' is already saved")]
    DuplicateId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for photocal operations.
pub type PhotocalResult<T> = Result<T, PhotocalError>;
