//! Discograph: discourse-graph document translation
//!
//! Translates a long document by splitting it into discourse units, inferring
//! a dependency graph between units, and translating each unit in graph order
//! while propagating memory (entity mappings, connectives, running summaries)
//! from its predecessors.
//!
//! # Core Concepts
//!
//! - **Discourse units**: maximal runs of consecutive sentences, one node each
//! - **Edges**: `(u, v)` with `u < v`, meaning `u` must be translated before `v`
//! - **Memory**: local memory extracted after a unit is translated, and
//!   incident memory aggregated from a unit's predecessors before it is
//! - **Oracles**: external classification and generation services, reached
//!   through async traits so tests can script them
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use discograph::{LanguagePair, Oracles, ScriptedOracle, WorkflowBuilder};
//!
//! let oracle = Arc::new(ScriptedOracle::new());
//! let workflow = WorkflowBuilder::new(Oracles::uniform(oracle), LanguagePair::new("English", "German"))
//!     .build()
//!     .unwrap();
//! // workflow.run(sentences, destination, None).await drives one document
//! # let _ = workflow;
//! ```

mod cancel;
pub mod config;
pub mod graph;
pub mod memory;
pub mod oracle;
pub mod storage;
pub mod workflow;

pub use cancel::{Cancelled, CancellationToken};
pub use config::{AppConfig, ConfigError, ConfigResult};
pub use graph::{DiscourseGraph, DiscourseUnit, Edge, EdgeSet, GraphBuilder, GraphConfig, UnitId};
pub use memory::{Memory, MemoryComponent, MemoryConfig, MemoryStore};
pub use oracle::{
    CallPolicy, EdgeOracle, GenerationOracle, LanguagePair, MemoryOracle, OracleError, Oracles,
    ScriptedOracle, SegmentationOracle, TranslationRequest,
};
pub use storage::{load_artifact, read_sentences, write_artifact, DocumentArtifact, LoadedDocument, StorageError, StorageResult};
pub use workflow::{
    Extension, FailurePolicy, ModuleKind, RetrievalProvider, RunOutcome, RunReport,
    TerminologyProvider, TranslationWorkflow, WorkflowBuilder, WorkflowError, WorkflowResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
