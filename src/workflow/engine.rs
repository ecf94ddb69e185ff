//! TranslationWorkflow: builds the graph, then translates unit by unit

use super::extensions::{Extension, ModuleKind, RetrievalProvider, TerminologyProvider};
use super::report::{FailurePolicy, RunOutcome, RunReport};
use super::state::{GraphRunState, WorkflowStep};
use super::{WorkflowError, WorkflowResult};
use crate::cancel::CancellationToken;
use crate::config::AppConfig;
use crate::graph::{DiscourseGraph, GraphBuilder, GraphConfig};
use crate::memory::{Memory, MemoryConfig, MemoryStore};
use crate::oracle::{CallPolicy, GenerationOracle, LanguagePair, Oracles, TranslationRequest};
use crate::storage::{write_artifact, DocumentArtifact};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PROGRESS_EVERY: usize = 10;

/// Configures and validates a [`TranslationWorkflow`].
pub struct WorkflowBuilder {
    oracles: Oracles,
    languages: LanguagePair,
    graph: GraphConfig,
    memory: MemoryConfig,
    policy: CallPolicy,
    failure: FailurePolicy,
    max_failed_units: Option<usize>,
    modules: Vec<String>,
    terminology: Extension<dyn TerminologyProvider>,
    retrieval: Extension<dyn RetrievalProvider>,
}

impl WorkflowBuilder {
    pub fn new(oracles: Oracles, languages: LanguagePair) -> Self {
        Self {
            oracles,
            languages,
            graph: GraphConfig::default(),
            memory: MemoryConfig::default(),
            policy: CallPolicy::default(),
            failure: FailurePolicy::default(),
            max_failed_units: None,
            modules: Vec::new(),
            terminology: Extension::Absent,
            retrieval: Extension::Absent,
        }
    }

    /// Take languages, tunables, failure handling, and module names from a
    /// loaded configuration.
    pub fn from_config(oracles: Oracles, config: &AppConfig) -> Self {
        Self::new(oracles, config.language_pair())
            .with_graph_config(config.graph_config())
            .with_memory_config(config.memory_config())
            .with_call_policy(config.call_policy())
            .with_failure_policy(config.failure_policy())
            .with_max_failed_units(config.failure.max_failed_units)
            .with_modules(config.modules.clone())
    }

    pub fn with_languages(mut self, languages: LanguagePair) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_graph_config(mut self, config: GraphConfig) -> Self {
        self.graph = config;
        self
    }

    pub fn with_memory_config(mut self, config: MemoryConfig) -> Self {
        self.memory = config;
        self
    }

    pub fn with_call_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_max_failed_units(mut self, max: Option<usize>) -> Self {
        self.max_failed_units = max;
        self
    }

    /// Optional modules the run must have providers for.
    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_terminology(mut self, provider: Arc<dyn TerminologyProvider>) -> Self {
        self.terminology = Extension::Present(provider);
        self
    }

    pub fn with_retrieval(mut self, provider: Arc<dyn RetrievalProvider>) -> Self {
        self.retrieval = Extension::Present(provider);
        self
    }

    /// Check that every named module has a provider, then assemble the
    /// workflow. Nothing here touches an oracle.
    pub fn build(self) -> WorkflowResult<TranslationWorkflow> {
        for name in &self.modules {
            let kind: ModuleKind = name.parse()?;
            let provided = match kind {
                ModuleKind::Terminology => self.terminology.is_present(),
                ModuleKind::Retrieval => self.retrieval.is_present(),
            };
            if !provided {
                return Err(WorkflowError::UnsupportedModule(kind.name().to_string()));
            }
        }

        let graph_builder = GraphBuilder::new(
            self.oracles.segmentation,
            self.oracles.edge,
            self.policy.clone(),
            self.graph,
        );
        let memory = MemoryStore::new(self.oracles.memory, self.policy.clone(), self.memory);

        Ok(TranslationWorkflow {
            graph_builder,
            memory,
            generation: self.oracles.generation,
            policy: self.policy,
            languages: self.languages,
            failure: self.failure,
            max_failed_units: self.max_failed_units,
            terminology: self.terminology,
            retrieval: self.retrieval,
        })
    }
}

/// Walks one document's graph in ascending id order.
pub struct TranslationWorkflow {
    graph_builder: GraphBuilder,
    memory: MemoryStore,
    generation: Arc<dyn GenerationOracle>,
    policy: CallPolicy,
    languages: LanguagePair,
    failure: FailurePolicy,
    max_failed_units: Option<usize>,
    terminology: Extension<dyn TerminologyProvider>,
    retrieval: Extension<dyn RetrievalProvider>,
}

/// Result of the TRANSLATE step for one unit.
enum UnitOutcome {
    Translated,
    Failed,
}

impl TranslationWorkflow {
    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    /// Run the whole workflow and write the artifact to `destination`.
    ///
    /// With `preloaded` units the graph is not rebuilt; every unit is
    /// translated again from the first one.
    pub async fn run(
        &self,
        sentences: Vec<String>,
        destination: &Path,
        preloaded: Option<DiscourseGraph>,
    ) -> WorkflowResult<RunOutcome> {
        self.run_with_cancel(sentences, destination, preloaded, &CancellationToken::new())
            .await
    }

    /// As [`run`](Self::run), stopping at the next suspension point once
    /// `cancel` fires. A cancelled run writes nothing.
    pub async fn run_with_cancel(
        &self,
        sentences: Vec<String>,
        destination: &Path,
        preloaded: Option<DiscourseGraph>,
        cancel: &CancellationToken,
    ) -> WorkflowResult<RunOutcome> {
        let mut state = GraphRunState::new(sentences, preloaded);
        let mut report = RunReport::default();
        let mut step = WorkflowStep::BuildGraph;

        loop {
            debug!(?step, cursor = state.cursor, "workflow step");
            step = match step {
                WorkflowStep::BuildGraph => {
                    self.build_graph(&mut state, cancel).await?;
                    if state.is_exhausted() {
                        WorkflowStep::Finalize
                    } else {
                        WorkflowStep::PrepareMemory
                    }
                }
                WorkflowStep::PrepareMemory => {
                    if cancel.is_cancelled() {
                        return Err(WorkflowError::Cancelled { completed: state.cursor });
                    }
                    self.prepare_memory(&mut state);
                    WorkflowStep::Translate
                }
                WorkflowStep::Translate => {
                    let id = state.cursor;
                    match self.translate_current(&mut state, cancel).await? {
                        UnitOutcome::Translated => report.translated_units += 1,
                        UnitOutcome::Failed => report.failed_units.push(id),
                    }
                    state.cursor += 1;
                    if state.cursor % PROGRESS_EVERY == 0 {
                        info!(
                            translated = state.cursor,
                            total = state.units.len(),
                            "translation progress"
                        );
                    }
                    if state.is_exhausted() {
                        WorkflowStep::Finalize
                    } else {
                        WorkflowStep::PrepareMemory
                    }
                }
                WorkflowStep::Finalize => return self.finalize(state, destination, report),
            };
        }
    }

    /// BUILD_GRAPH: keep preloaded units (rewound), or construct them.
    async fn build_graph(
        &self,
        state: &mut GraphRunState,
        cancel: &CancellationToken,
    ) -> WorkflowResult<()> {
        if state.has_graph() {
            let graph = DiscourseGraph::new(
                std::mem::take(&mut state.units),
                std::mem::take(&mut state.edges),
            );
            graph.validate().map_err(WorkflowError::InvalidState)?;
            state.units = graph.units;
            state.edges = graph.edges;
            state.rewind();
            info!(units = state.units.len(), edges = state.edges.len(), "using preloaded graph");
            return Ok(());
        }

        let graph = self
            .graph_builder
            .build(&state.source_sentences, cancel)
            .await
            .map_err(|_| WorkflowError::Cancelled { completed: 0 })?;
        state.units = graph.units;
        state.edges = graph.edges;
        state.cursor = 0;
        Ok(())
    }

    /// PREPARE_MEMORY: aggregate the direct predecessors' local memories
    /// into the current unit's incident memory.
    fn prepare_memory(&self, state: &mut GraphRunState) {
        let cursor = state.cursor;
        let incident = {
            let predecessors: Vec<&Memory> = state
                .edges
                .predecessors(cursor)
                .filter_map(|id| state.units.get(id))
                .map(|unit| &unit.local_memory)
                .collect();
            self.memory.get_incident_memory(&predecessors)
        };
        if let Some(unit) = state.units.get_mut(cursor) {
            unit.incident_memory = incident;
        }
    }

    /// TRANSLATE: generate the current unit's target text, then extract its
    /// local memory. Cancellation discards the unit's incident memory and
    /// anything generated for it.
    async fn translate_current(
        &self,
        state: &mut GraphRunState,
        cancel: &CancellationToken,
    ) -> WorkflowResult<UnitOutcome> {
        let cursor = state.cursor;
        let Some(unit) = state.units.get(cursor) else {
            return Err(WorkflowError::InvalidState(format!("cursor {} past last unit", cursor)));
        };
        let source_text = unit.source_text.clone();
        let encoded = self.memory.encode_memory(&unit.incident_memory);

        if cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled { completed: cursor });
        }
        let terminology = self.terminology_for(&source_text).await;
        let retrieval = self.retrieval_for(&source_text).await;
        let request = TranslationRequest {
            source_text: &source_text,
            languages: &self.languages,
            memory: &encoded,
            terminology: terminology.as_deref(),
            retrieval: retrieval.as_deref(),
        };

        let generated = self
            .policy
            .call("translate", || self.generation.translate(&request))
            .await;
        if cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled { completed: cursor });
        }

        let target_text = match generated {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(unit = cursor, "translation came back empty");
                return Ok(self.mark_failed(state, cursor));
            }
            Err(e) => {
                warn!(unit = cursor, error = %e, "translation failed");
                return Ok(self.mark_failed(state, cursor));
            }
        };

        let local_memory = self
            .memory
            .get_local_memory(&source_text, &target_text, &self.languages)
            .await;
        if cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled { completed: cursor });
        }

        if let Some(unit) = state.units.get_mut(cursor) {
            unit.target_text = Some(target_text);
            unit.local_memory = local_memory;
        }
        Ok(UnitOutcome::Translated)
    }

    fn mark_failed(&self, state: &mut GraphRunState, cursor: usize) -> UnitOutcome {
        if let Some(unit) = state.units.get_mut(cursor) {
            unit.target_text = self.failure.failed_target();
            unit.local_memory = Memory::default();
        }
        UnitOutcome::Failed
    }

    async fn terminology_for(&self, source_text: &str) -> Option<String> {
        let provider = self.terminology.provider()?;
        match provider.terminology(source_text, &self.languages).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "terminology provider failed");
                None
            }
        }
    }

    async fn retrieval_for(&self, source_text: &str) -> Option<String> {
        let provider = self.retrieval.provider()?;
        match provider.retrieve(source_text, &self.languages).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "retrieval provider failed");
                None
            }
        }
    }

    /// FINALIZE: join the translated units and write the artifact.
    fn finalize(
        &self,
        mut state: GraphRunState,
        destination: &Path,
        mut report: RunReport,
    ) -> WorkflowResult<RunOutcome> {
        state.target_sentences = state
            .units
            .iter()
            .filter_map(|unit| unit.target_text.clone())
            .filter(|text| !text.is_empty())
            .collect();
        state.target_document = state.target_sentences.join(" ");

        report.unit_count = state.units.len();
        report.edge_count = state.edges.len();
        report.apply_threshold(self.max_failed_units);

        let artifact = DocumentArtifact {
            source_document: state.source_sentences.join(" "),
            source_sentences: state.source_sentences,
            target_sentences: state.target_sentences.clone(),
            target_document: state.target_document.clone(),
            discourses: state.units,
            edges: state.edges,
        };
        write_artifact(destination, &artifact)?;

        if report.incomplete {
            warn!(
                failed = report.failed_count(),
                max = ?self.max_failed_units,
                "document is incomplete"
            );
        }
        info!(
            units = report.unit_count,
            translated = report.translated_units,
            failed = report.failed_count(),
            path = %destination.display(),
            "run finished"
        );

        Ok(RunOutcome {
            target_document: state.target_document,
            target_sentences: state.target_sentences,
            report,
        })
    }
}
