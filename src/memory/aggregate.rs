//! Reductions from predecessor local memories to one incident memory.
//!
//! Each component has its own policy, kept as a separate function:
//! entity mappings union-merge, the connective is last-writer-wins, and
//! summaries keep a trailing window. Predecessors arrive in processing order.

use super::types::{Memory, NO_SUMMARY};
use std::collections::BTreeMap;

/// Union of all mappings; a later predecessor overwrites an earlier one on
/// the same key.
pub fn merge_entity_mappings<'a, I>(memories: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a Memory>,
{
    let mut merged = BTreeMap::new();
    for memory in memories {
        for (source, target) in &memory.entity_mapping {
            merged.insert(source.clone(), target.clone());
        }
    }
    merged
}

/// The connective of the last predecessor, even when that one is empty.
pub fn last_connective<'a, I>(memories: I) -> String
where
    I: IntoIterator<Item = &'a Memory>,
{
    memories
        .into_iter()
        .last()
        .map(|m| m.discourse_connective.clone())
        .unwrap_or_default()
}

/// The most recent `window` non-empty summaries, oldest first, space-joined.
/// `(none)` when there are none.
pub fn recent_summaries<'a, I>(memories: I, window: usize) -> String
where
    I: IntoIterator<Item = &'a Memory>,
{
    let summaries: Vec<&str> = memories
        .into_iter()
        .map(|m| m.context_summary.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let start = summaries.len().saturating_sub(window);
    let joined = summaries[start..].join(" ");
    if joined.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        joined
    }
}

/// Incident memory for a unit whose predecessors hold `memories`.
pub fn aggregate_incident(memories: &[&Memory], summary_window: usize) -> Memory {
    Memory {
        entity_mapping: merge_entity_mappings(memories.iter().copied()),
        discourse_connective: last_connective(memories.iter().copied()),
        context_summary: recent_summaries(memories.iter().copied(), summary_window),
    }
}
