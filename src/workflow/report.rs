//! What happens to failed units, and what a run reports back

use crate::graph::UnitId;

/// Treatment of a unit whose translation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave `target_text` absent and omit the unit from the document
    #[default]
    Drop,
    /// Store this text as the unit's translation and keep it in the document
    Placeholder(String),
}

impl FailurePolicy {
    /// The target text a failed unit ends up with.
    pub fn failed_target(&self) -> Option<String> {
        match self {
            Self::Drop => None,
            Self::Placeholder(text) => Some(text.clone()),
        }
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub unit_count: usize,
    pub edge_count: usize,
    pub translated_units: usize,
    /// Units whose translation failed, ascending
    pub failed_units: Vec<UnitId>,
    /// More units failed than the configured threshold allows
    pub incomplete: bool,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.failed_units.len()
    }

    /// Apply the failure threshold; with none configured a run is never
    /// marked incomplete.
    pub fn apply_threshold(&mut self, max_failed_units: Option<usize>) {
        self.incomplete = max_failed_units.is_some_and(|max| self.failed_units.len() > max);
    }
}

/// What a run hands back besides the artifact it wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub target_document: String,
    /// Target text of each translated unit, in unit order
    pub target_sentences: Vec<String>,
    pub report: RunReport,
}
