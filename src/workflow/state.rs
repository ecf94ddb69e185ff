//! Per-run state owned by the workflow loop

use crate::graph::{DiscourseGraph, DiscourseUnit, EdgeSet};

/// The steps of the translation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    BuildGraph,
    PrepareMemory,
    Translate,
    Finalize,
}

/// Everything one run mutates: the units, their edges, and a cursor into
/// the units. Created at run start, discarded once the artifact is written.
#[derive(Debug, Clone, Default)]
pub struct GraphRunState {
    pub units: Vec<DiscourseUnit>,
    pub edges: EdgeSet,
    /// Index of the unit being prepared or translated
    pub cursor: usize,
    pub source_sentences: Vec<String>,
    pub target_sentences: Vec<String>,
    pub target_document: String,
}

impl GraphRunState {
    pub fn new(source_sentences: Vec<String>, preloaded: Option<DiscourseGraph>) -> Self {
        let graph = preloaded.unwrap_or_default();
        Self {
            units: graph.units,
            edges: graph.edges,
            source_sentences,
            ..Self::default()
        }
    }

    /// True when units came with the state instead of from construction.
    pub fn has_graph(&self) -> bool {
        !self.units.is_empty()
    }

    /// Forget every translation and memory, and rewind to the first unit.
    pub fn rewind(&mut self) {
        for unit in &mut self.units {
            unit.target_text = None;
            unit.clear_memory();
        }
        self.cursor = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.units.len()
    }

    pub fn current(&self) -> Option<&DiscourseUnit> {
        self.units.get(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_clears_translations_and_memory() {
        let mut graph = DiscourseGraph::from_segments(vec!["a".into(), "b".into()], EdgeSet::chain(2));
        graph.units[0].target_text = Some("A".into());
        graph.units[1].local_memory.context_summary = "stale".into();

        let mut state = GraphRunState::new(vec!["a".into(), "b".into()], Some(graph));
        state.cursor = 2;
        assert!(state.has_graph());
        assert!(state.is_exhausted());

        state.rewind();
        assert_eq!(state.cursor, 0);
        assert!(state.units.iter().all(|u| u.target_text.is_none()));
        assert!(state.units[1].local_memory.is_empty());
        assert_eq!(state.current().map(|u| u.id), Some(0));
    }

    #[test]
    fn fresh_state_has_no_graph() {
        let state = GraphRunState::new(vec!["x".into()], None);
        assert!(!state.has_graph());
        assert!(state.is_exhausted());
        assert!(state.current().is_none());
    }
}
