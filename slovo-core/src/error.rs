//! Error types for the slovo core library.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for store, trainer, and session operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The backing medium could not be opened or created.
    #[error("word store unavailable: {0}")]
    StoreUnavailable(String),

    /// An import source path does not exist.
    #[error("import source does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    /// Grading referenced a word that is not in the store.
    #[error("word not found in store: {0}")]
    WordNotFound(String),

    /// SQLite error from the table backend.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error from the file backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
