//! Memory value and its named components

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary text of an incident memory whose predecessors had nothing to say.
pub const NO_SUMMARY: &str = "(none)";

/// Context carried from one unit to its successors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Source term to target term; keys unique
    #[serde(default)]
    pub entity_mapping: BTreeMap<String, String>,
    /// At most one connective; empty means none
    #[serde(default)]
    pub discourse_connective: String,
    /// Most recent running summary
    #[serde(default)]
    pub context_summary: String,
}

impl Memory {
    /// Incident memory of a unit with no predecessors.
    pub fn placeholder() -> Self {
        Self {
            context_summary: NO_SUMMARY.to_string(),
            ..Self::default()
        }
    }

    /// True when no component carries content.
    pub fn is_empty(&self) -> bool {
        self.entity_mapping.is_empty()
            && self.discourse_connective.trim().is_empty()
            && self.context_summary.trim().is_empty()
    }
}

/// The components a memory is made of, in their default encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryComponent {
    EntityMapping,
    DiscourseConnective,
    ContextSummary,
}

impl MemoryComponent {
    pub const ALL: [MemoryComponent; 3] = [
        MemoryComponent::EntityMapping,
        MemoryComponent::DiscourseConnective,
        MemoryComponent::ContextSummary,
    ];

    /// Label used when the component is rendered for an oracle.
    pub fn label(self) -> &'static str {
        match self {
            Self::EntityMapping => "Entity mappings",
            Self::DiscourseConnective => "Discourse connectives",
            Self::ContextSummary => "Context summary",
        }
    }
}
