//! Persistence for translated documents
//!
//! One JSON artifact per document holds the sentences, the joined documents,
//! every unit record, and the edge list. The artifact is both the final
//! output and the seed for a later run (optionally in the reverse direction).
//! Input documents arrive as JSONL sentence files.

mod artifact;
mod sentences;

pub use artifact::{load_artifact, write_artifact, DocumentArtifact, LoadedDocument};
pub use sentences::read_sentences;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur reading or writing documents
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("Malformed sentence at {path}:{line}: {source}")]
    Sentence {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
