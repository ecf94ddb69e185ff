//! MemoryStore: local extraction through the memory oracle, plus the
//! aggregation and encoding policy

use super::aggregate::aggregate_incident;
use super::encode::{encode_memory, EncodingConfig};
use super::types::{Memory, MemoryComponent};
use crate::oracle::{CallPolicy, LanguagePair, MemoryOracle};
use std::sync::Arc;
use tracing::warn;

/// Tunables for aggregation and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// How many recent predecessor summaries an incident memory keeps
    pub summary_window: usize,
    pub encoding: EncodingConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            summary_window: 3,
            encoding: EncodingConfig::default(),
        }
    }
}

pub struct MemoryStore {
    oracle: Arc<dyn MemoryOracle>,
    policy: CallPolicy,
    config: MemoryConfig,
}

impl MemoryStore {
    pub fn new(oracle: Arc<dyn MemoryOracle>, policy: CallPolicy, config: MemoryConfig) -> Self {
        Self {
            oracle,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Extract a translated unit's local memory.
    ///
    /// The three components are independent calls; a failed call leaves its
    /// component empty. All three failing still yields a (empty) memory.
    pub async fn get_local_memory(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> Memory {
        let oracle = &self.oracle;
        let (entities, connective, summary) = tokio::join!(
            self.policy.call("entity_mapping", || {
                oracle.entity_mapping(source_text, target_text, languages)
            }),
            self.policy.call("discourse_connective", || {
                oracle.discourse_connective(source_text, target_text, languages)
            }),
            self.policy.call("context_summary", || {
                oracle.context_summary(source_text, target_text, languages)
            }),
        );

        let mut memory = Memory::default();
        match entities {
            Ok(map) => memory.entity_mapping = map,
            Err(e) => warn!(component = ?MemoryComponent::EntityMapping, error = %e, "memory extraction failed"),
        }
        match connective {
            Ok(c) => memory.discourse_connective = c.unwrap_or_default(),
            Err(e) => warn!(component = ?MemoryComponent::DiscourseConnective, error = %e, "memory extraction failed"),
        }
        match summary {
            Ok(s) => memory.context_summary = s,
            Err(e) => warn!(component = ?MemoryComponent::ContextSummary, error = %e, "memory extraction failed"),
        }
        memory
    }

    /// Aggregate the local memories of a unit's direct predecessors, given
    /// in predecessor processing order.
    pub fn get_incident_memory(&self, predecessors: &[&Memory]) -> Memory {
        aggregate_incident(predecessors, self.config.summary_window)
    }

    pub fn encode_memory(&self, memory: &Memory) -> String {
        encode_memory(memory, &self.config.encoding)
    }
}
