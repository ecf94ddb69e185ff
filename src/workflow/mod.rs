//! Translation workflow: the state machine that walks a discourse graph
//!
//! `BUILD_GRAPH -> PREPARE_MEMORY -> TRANSLATE -> (PREPARE_MEMORY | FINALIZE)`.
//! Units are visited in ascending id order, which is a valid topological
//! order because every edge points forward.

mod engine;
mod extensions;
mod report;
mod state;

pub use engine::{TranslationWorkflow, WorkflowBuilder};
pub use extensions::{Extension, ModuleKind, RetrievalProvider, TerminologyProvider};
pub use report::{FailurePolicy, RunOutcome, RunReport};
pub use state::{GraphRunState, WorkflowStep};

use crate::storage::StorageError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that end a run or prevent one from starting
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unsupported module '{0}': no implementation is available")]
    UnsupportedModule(String),

    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Run cancelled after {completed} translated units")]
    Cancelled { completed: usize },

    #[error("Invalid run state: {0}")]
    InvalidState(String),
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Fail fast when a stage's input file or directory does not exist.
pub fn require_input(path: &Path) -> WorkflowResult<&Path> {
    if path.exists() {
        Ok(path)
    } else {
        Err(WorkflowError::MissingInput(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_input_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_input(dir.path()).is_ok());

        let missing = dir.path().join("nope.jsonl");
        match require_input(&missing) {
            Err(WorkflowError::MissingInput(path)) => assert_eq!(path, missing),
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }
}
