//! Shared fixtures for the integration tests
//!
//! Every test drives the workflow with a `ScriptedOracle`, so runs are
//! deterministic and need no network.

#![allow(dead_code)]

use discograph::{
    CallPolicy, GraphConfig, LanguagePair, Memory, Oracles, ScriptedOracle, TranslationWorkflow,
    WorkflowBuilder,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub fn languages() -> LanguagePair {
    LanguagePair::new("German", "English")
}

/// One attempt, short timeout, no backoff.
pub fn quick_policy() -> CallPolicy {
    CallPolicy::default()
        .with_timeout(Duration::from_secs(5))
        .with_retries(1, Duration::ZERO)
}

pub fn workflow(oracle: Arc<ScriptedOracle>, graph: GraphConfig) -> TranslationWorkflow {
    WorkflowBuilder::new(Oracles::uniform(oracle), languages())
        .with_graph_config(graph)
        .with_call_policy(quick_policy())
        .build()
        .expect("workflow without modules always builds")
}

pub fn to_strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

/// Local memory that names the unit it was extracted from: the source maps
/// to the target, and the summary repeats the source.
pub fn tagged_memory(source: &str, target: &str) -> Memory {
    Memory {
        entity_mapping: BTreeMap::from([(source.to_string(), target.to_string())]),
        discourse_connective: "then".to_string(),
        context_summary: format!("sum {}", source),
    }
}
