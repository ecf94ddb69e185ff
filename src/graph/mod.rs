//! Discourse graph: units, dependency edges, and their construction

mod builder;
mod edge;
mod unit;

#[cfg(test)]
mod tests;

pub use builder::{GraphBuilder, GraphConfig};
pub use edge::{Edge, EdgeSet};
pub use unit::{DiscourseUnit, UnitId};

use serde::{Deserialize, Serialize};

/// Units plus the edges between them.
///
/// This is also the shape of a preloaded graph handed to a run: memories are
/// empty and get recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscourseGraph {
    pub units: Vec<DiscourseUnit>,
    pub edges: EdgeSet,
}

impl DiscourseGraph {
    pub fn new(units: Vec<DiscourseUnit>, edges: EdgeSet) -> Self {
        Self { units, edges }
    }

    /// Materialize units from segment texts, ids in construction order.
    pub fn from_segments(segments: Vec<String>, edges: EdgeSet) -> Self {
        let units = segments
            .into_iter()
            .enumerate()
            .map(|(id, text)| DiscourseUnit::new(id, text))
            .collect();
        Self { units, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check that ids are dense and positional and that every edge points
    /// forward between existing units.
    pub fn validate(&self) -> Result<(), String> {
        for (position, unit) in self.units.iter().enumerate() {
            if unit.id != position {
                return Err(format!("unit at position {} has id {}", position, unit.id));
            }
        }
        self.edges.validate(self.units.len())
    }
}
