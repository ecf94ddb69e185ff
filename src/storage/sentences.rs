//! JSONL sentence input: one `{"text": "..."}` object per line

use super::{StorageError, StorageResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct SentenceRecord {
    text: String,
}

/// Read the sentences of one document, in file order. Blank lines are skipped.
pub fn read_sentences(path: impl AsRef<Path>) -> StorageResult<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<SentenceRecord>(line)
                .map(|record| record.text)
                .map_err(|source| StorageError::Sentence {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })
        })
        .collect()
}
