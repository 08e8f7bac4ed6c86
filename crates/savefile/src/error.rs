//! Error types raised by the save manager and its collaborators.

use thiserror::Error;

/// Errors surfaced by save-file operations.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("retention limit must be at least 1, got {0}")]
    InvalidRetentionLimit(usize),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file not found: {0}")]
    NotFound(String),

    #[error("file name does not refer to an entry of the save directory: {0:?}")]
    InvalidFileName(String),

    /// The directory has no entries at all.
    #[error("no save files found")]
    NoSaveFiles,

    /// The directory has entries, but none of them is a save file.
    #[error("no valid save files found")]
    NoValidSaveFiles,

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, SaveError>;
