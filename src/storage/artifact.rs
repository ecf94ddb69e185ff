//! Document artifact: the annotated graph plus document-level text

use super::{StorageError, StorageResult};
use crate::graph::{DiscourseGraph, DiscourseUnit, EdgeSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// The persisted shape of one translated document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub source_sentences: Vec<String>,
    /// Target text of each translated unit, in unit order
    pub target_sentences: Vec<String>,
    pub source_document: String,
    pub target_document: String,
    pub discourses: Vec<DiscourseUnit>,
    pub edges: EdgeSet,
}

impl DocumentArtifact {
    /// Validate ids and edges the way a preloaded graph must be.
    pub fn validate(&self) -> Result<(), String> {
        for (position, unit) in self.discourses.iter().enumerate() {
            if unit.id != position {
                return Err(format!("unit at position {} has id {}", position, unit.id));
            }
        }
        self.edges.validate(self.discourses.len())
    }
}

/// An artifact read back for another run. Memories are always empty and an
/// empty target text is read as no translation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDocument {
    pub source_sentences: Vec<String>,
    pub target_sentences: Vec<String>,
    pub graph: DiscourseGraph,
}

impl LoadedDocument {
    /// Exchange source and target everywhere: sentence lists and every unit.
    /// Applying it twice restores the original.
    pub fn swapped(mut self) -> Self {
        std::mem::swap(&mut self.source_sentences, &mut self.target_sentences);
        for unit in &mut self.graph.units {
            unit.swap_direction();
        }
        self
    }

    /// The preloaded state handed to a run.
    pub fn into_graph(self) -> DiscourseGraph {
        self.graph
    }
}

impl From<DocumentArtifact> for LoadedDocument {
    fn from(artifact: DocumentArtifact) -> Self {
        let mut units = artifact.discourses;
        for unit in &mut units {
            unit.clear_memory();
            if unit.target_text.as_deref() == Some("") {
                unit.target_text = None;
            }
        }
        Self {
            source_sentences: artifact.source_sentences,
            target_sentences: artifact.target_sentences,
            graph: DiscourseGraph::new(units, artifact.edges),
        }
    }
}

/// Write `artifact` as pretty JSON, creating parent directories.
///
/// Writes to a sibling temp file first and renames it into place, so a
/// reader never sees a half-written artifact.
pub fn write_artifact(path: impl AsRef<Path>, artifact: &DocumentArtifact) -> StorageResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(artifact)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json)?;
    fs::rename(&staging, path)?;
    debug!(path = %path.display(), units = artifact.discourses.len(), "wrote artifact");
    Ok(())
}

/// Read an artifact back for another run, optionally swapping direction.
///
/// Persisted memories are discarded. Ids must be dense and in order and
/// every edge must point forward between existing units.
pub fn load_artifact(path: impl AsRef<Path>, swap: bool) -> StorageResult<LoadedDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let artifact: DocumentArtifact = serde_json::from_str(&content)?;
    artifact
        .validate()
        .map_err(|reason| StorageError::InvalidArtifact {
            path: path.to_path_buf(),
            reason,
        })?;

    let loaded = LoadedDocument::from(artifact);
    Ok(if swap { loaded.swapped() } else { loaded })
}
