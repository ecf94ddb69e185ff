//! Scripted oracle: answers every contract from caller-supplied closures.
//!
//! Used by tests and examples to drive the workflow deterministically.
//! Defaults: never extend a unit, no long-range edges, echo the source text
//! as the translation, extract an empty memory.

use super::{
    EdgeOracle, GenerationOracle, LanguagePair, MemoryOracle, OracleResult, SegmentationOracle,
    TranslationRequest,
};
use crate::memory::Memory;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Decide = Arc<dyn Fn(&str, &str) -> OracleResult<bool> + Send + Sync>;
type Generate = Arc<dyn Fn(&str) -> OracleResult<String> + Send + Sync>;
type Extract = Arc<dyn Fn(&str, &str) -> OracleResult<Memory> + Send + Sync>;

/// What the generation oracle was asked, captured per call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub source_text: String,
    pub memory: String,
    pub terminology: Option<String>,
    pub retrieval: Option<String>,
}

pub struct ScriptedOracle {
    segmenter: Decide,
    edges: Decide,
    translator: Generate,
    extractor: Extract,
    segmentation_calls: AtomicUsize,
    edge_calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            segmenter: Arc::new(|_, _| Ok(false)),
            edges: Arc::new(|_, _| Ok(false)),
            translator: Arc::new(|source| Ok(source.to_string())),
            extractor: Arc::new(|_, _| Ok(Memory::default())),
            segmentation_calls: AtomicUsize::new(0),
            edge_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(unit_text, next_sentence) -> extend?`
    pub fn with_segmenter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> OracleResult<bool> + Send + Sync + 'static,
    {
        self.segmenter = Arc::new(f);
        self
    }

    /// `(earlier, later) -> later depends on earlier?`
    pub fn with_edges<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> OracleResult<bool> + Send + Sync + 'static,
    {
        self.edges = Arc::new(f);
        self
    }

    /// `source_text -> translation`
    pub fn with_translator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> OracleResult<String> + Send + Sync + 'static,
    {
        self.translator = Arc::new(f);
        self
    }

    /// `(source_text, target_text) -> memory`. The three memory calls each
    /// take their component from this one closure.
    pub fn with_extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> OracleResult<Memory> + Send + Sync + 'static,
    {
        self.extractor = Arc::new(f);
        self
    }

    pub fn segmentation_calls(&self) -> usize {
        self.segmentation_calls.load(Ordering::SeqCst)
    }

    pub fn edge_calls(&self) -> usize {
        self.edge_calls.load(Ordering::SeqCst)
    }

    /// Generation requests in the order they were made.
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SegmentationOracle for ScriptedOracle {
    async fn continues_unit(&self, unit_text: &str, next_sentence: &str) -> OracleResult<bool> {
        self.segmentation_calls.fetch_add(1, Ordering::SeqCst);
        (self.segmenter)(unit_text, next_sentence)
    }
}

#[async_trait]
impl EdgeOracle for ScriptedOracle {
    async fn depends_on(&self, earlier: &str, later: &str) -> OracleResult<bool> {
        self.edge_calls.fetch_add(1, Ordering::SeqCst);
        (self.edges)(earlier, later)
    }
}

#[async_trait]
impl MemoryOracle for ScriptedOracle {
    async fn entity_mapping(
        &self,
        source_text: &str,
        target_text: &str,
        _languages: &LanguagePair,
    ) -> OracleResult<BTreeMap<String, String>> {
        (self.extractor)(source_text, target_text).map(|m| m.entity_mapping)
    }

    async fn discourse_connective(
        &self,
        source_text: &str,
        target_text: &str,
        _languages: &LanguagePair,
    ) -> OracleResult<Option<String>> {
        (self.extractor)(source_text, target_text)
            .map(|m| Some(m.discourse_connective).filter(|c| !c.is_empty()))
    }

    async fn context_summary(
        &self,
        source_text: &str,
        target_text: &str,
        _languages: &LanguagePair,
    ) -> OracleResult<String> {
        (self.extractor)(source_text, target_text).map(|m| m.context_summary)
    }
}

#[async_trait]
impl GenerationOracle for ScriptedOracle {
    async fn translate(&self, request: &TranslationRequest<'_>) -> OracleResult<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(RecordedRequest {
                source_text: request.source_text.to_string(),
                memory: request.memory.to_string(),
                terminology: request.terminology.map(str::to_string),
                retrieval: request.retrieval.map(str::to_string),
            });
        }
        (self.translator)(request.source_text)
    }
}
