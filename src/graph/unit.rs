//! Discourse unit: one node of the graph

use crate::memory::Memory;
use serde::{Deserialize, Serialize};

/// Position of a unit in construction order (0-based, dense).
pub type UnitId = usize;

/// A run of consecutive sentences translated as one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscourseUnit {
    pub id: UnitId,
    /// Space-joined sentences; fixed at construction
    pub source_text: String,
    /// Absent until the unit is translated
    #[serde(default)]
    pub target_text: Option<String>,
    /// Aggregated from direct predecessors just before translation
    #[serde(default)]
    pub incident_memory: Memory,
    /// Extracted from this unit's own translation
    #[serde(default)]
    pub local_memory: Memory,
}

impl DiscourseUnit {
    pub fn new(id: UnitId, source_text: impl Into<String>) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            target_text: None,
            incident_memory: Memory::default(),
            local_memory: Memory::default(),
        }
    }

    /// True once a non-empty translation is stored.
    pub fn is_translated(&self) -> bool {
        self.target_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Drop both memories. Memory is never trusted across runs.
    pub fn clear_memory(&mut self) {
        self.incident_memory = Memory::default();
        self.local_memory = Memory::default();
    }

    /// Exchange source and target text. A missing target becomes an empty
    /// source; an empty source becomes a missing target.
    pub fn swap_direction(&mut self) {
        let old_source = std::mem::take(&mut self.source_text);
        self.source_text = self.target_text.take().unwrap_or_default();
        self.target_text = Some(old_source).filter(|s| !s.is_empty());
    }
}
