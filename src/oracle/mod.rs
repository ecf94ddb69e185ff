//! Oracle contracts: the external classification and generation services
//!
//! Every decision the core cannot make itself goes through one of these
//! traits. Implementations:
//! - `ChatOracle`: OpenAI-compatible chat endpoint over HTTP (feature `http`)
//! - `ScriptedOracle`: deterministic, closure-driven answers (testing)
//!
//! All calls may fail. Callers wrap them in a [`CallPolicy`] and replace a
//! persistent failure with a conservative default; an `OracleError` never
//! escapes the workflow.

#[cfg(feature = "http")]
mod chat;
mod policy;
mod scripted;

#[cfg(feature = "http")]
pub use chat::{ChatEndpoint, ChatOracle};
pub use policy::CallPolicy;
pub use scripted::{RecordedRequest, ScriptedOracle};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Errors from oracle calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("oracle not available: {0}")]
    Unavailable(String),
    #[error("invocation failed: {0}")]
    InvocationFailed(String),
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("oracle call timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for oracle calls
pub type OracleResult<T> = Result<T, OracleError>;

/// The language direction of a run.
///
/// Names are handed verbatim to the oracles ("English", "German", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The reverse direction, used for back-translation runs.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// "Does the next sentence belong to the current discourse unit?"
#[async_trait]
pub trait SegmentationOracle: Send + Sync {
    async fn continues_unit(&self, unit_text: &str, next_sentence: &str) -> OracleResult<bool>;
}

/// "Does the later unit depend on the earlier one?"
///
/// Both texts arrive already truncated to the configured maximum length.
#[async_trait]
pub trait EdgeOracle: Send + Sync {
    async fn depends_on(&self, earlier: &str, later: &str) -> OracleResult<bool>;
}

/// Extracts the three memory components from a translated unit.
///
/// Each method is an independent call and may fail on its own.
#[async_trait]
pub trait MemoryOracle: Send + Sync {
    /// Source term to target term, possibly empty.
    async fn entity_mapping(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<BTreeMap<String, String>>;

    /// At most one connective.
    async fn discourse_connective(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<Option<String>>;

    async fn context_summary(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<String>;
}

/// Everything the generation oracle sees for one unit.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub source_text: &'a str,
    pub languages: &'a LanguagePair,
    /// Encoded incident memory; empty when the unit has no usable context
    pub memory: &'a str,
    /// Present only when a terminology provider is active
    pub terminology: Option<&'a str>,
    /// Present only when a retrieval provider is active
    pub retrieval: Option<&'a str>,
}

/// "Translate this discourse unit given this context."
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    async fn translate(&self, request: &TranslationRequest<'_>) -> OracleResult<String>;
}

/// The full set of oracles one workflow talks to.
#[derive(Clone)]
pub struct Oracles {
    pub segmentation: Arc<dyn SegmentationOracle>,
    pub edge: Arc<dyn EdgeOracle>,
    pub memory: Arc<dyn MemoryOracle>,
    pub generation: Arc<dyn GenerationOracle>,
}

impl Oracles {
    /// One implementation answering every contract.
    pub fn uniform<O>(oracle: Arc<O>) -> Self
    where
        O: SegmentationOracle + EdgeOracle + MemoryOracle + GenerationOracle + 'static,
    {
        Self {
            segmentation: oracle.clone(),
            edge: oracle.clone(),
            memory: oracle.clone(),
            generation: oracle,
        }
    }

    /// Classification and extraction from one service, generation from another.
    pub fn split<P, G>(processing: Arc<P>, generation: Arc<G>) -> Self
    where
        P: SegmentationOracle + EdgeOracle + MemoryOracle + 'static,
        G: GenerationOracle + 'static,
    {
        Self {
            segmentation: processing.clone(),
            edge: processing.clone(),
            memory: processing,
            generation,
        }
    }
}

impl std::fmt::Debug for Oracles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracles").finish_non_exhaustive()
    }
}
