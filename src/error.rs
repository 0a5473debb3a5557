//! Error types for corpus loading, sessions and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the frequency corpus or the allow-list.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed corpus file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header row lacks a required column.
    #[error("corpus file {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Errors that end a sampling session early.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("corpus view for length {word_length} has {actual} words, need at least {required}")]
    InsufficientWords {
        word_length: usize,
        required: usize,
        actual: usize,
    },

    #[error("session for length {word_length} ended without a single observation")]
    NoObservations { word_length: usize },

    #[error("operator exchange failed: {0}")]
    Operator(#[from] std::io::Error),
}

/// Errors raised while writing or reading the results record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("results record could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}
