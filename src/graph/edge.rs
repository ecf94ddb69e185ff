//! Directed dependency edges between discourse units

use super::unit::UnitId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `source` must be translated, and its local memory considered, before
/// `target`.
///
/// Serializes as a `[source, target]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(UnitId, UnitId)", into = "(UnitId, UnitId)")]
pub struct Edge {
    pub source: UnitId,
    pub target: UnitId,
}

impl Edge {
    pub fn new(source: UnitId, target: UnitId) -> Self {
        Self { source, target }
    }

    /// Forward edges keep ascending id order a valid schedule.
    pub fn is_forward(&self) -> bool {
        self.source < self.target
    }

    /// Edges between consecutive units.
    pub fn is_adjacent(&self) -> bool {
        self.target == self.source + 1
    }
}

impl From<(UnitId, UnitId)> for Edge {
    fn from((source, target): (UnitId, UnitId)) -> Self {
        Self { source, target }
    }
}

impl From<Edge> for (UnitId, UnitId) {
    fn from(edge: Edge) -> Self {
        (edge.source, edge.target)
    }
}

/// The edge set of one graph.
///
/// Ordered by `(source, target)`, so iteration and serialization are
/// deterministic regardless of the order edges were discovered in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeSet(BTreeSet<Edge>);

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The adjacency chain `(0,1), (1,2), ..., (n-2, n-1)`.
    pub fn chain(unit_count: usize) -> Self {
        (1..unit_count).map(|v| Edge::new(v - 1, v)).collect()
    }

    /// Returns false if the edge was already present.
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.0.insert(edge)
    }

    pub fn contains(&self, source: UnitId, target: UnitId) -> bool {
        self.0.contains(&Edge::new(source, target))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.0.iter()
    }

    /// Direct predecessors of `target`, ascending. This is the order their
    /// memories are aggregated in.
    pub fn predecessors(&self, target: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.0
            .iter()
            .filter(move |e| e.target == target)
            .map(|e| e.source)
    }

    /// Every edge must be forward and between ids below `unit_count`.
    pub fn validate(&self, unit_count: usize) -> Result<(), String> {
        for edge in &self.0 {
            if !edge.is_forward() {
                return Err(format!(
                    "edge ({}, {}) does not point forward",
                    edge.source, edge.target
                ));
            }
            if edge.target >= unit_count {
                return Err(format!(
                    "edge ({}, {}) references a unit beyond {}",
                    edge.source, edge.target, unit_count
                ));
            }
        }
        Ok(())
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Edge> for EdgeSet {
    fn extend<I: IntoIterator<Item = Edge>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::collections::btree_set::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
