//! Annotation persistence as a JSON sidecar next to the document.
//!
//! Saves happen synchronously on commit but never on the per-pointer-move
//! path; a failed save is logged by the caller and the in-memory store
//! stays authoritative until the next successful write.

use doc_model::{Bookmark, Highlight, Note};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ANNOTATION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Versioned on-disk envelope for one document's annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFile {
    pub version: u32,
    #[serde(default)]
    pub scroll_offset: f32,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl Default for AnnotationFile {
    fn default() -> Self {
        Self {
            version: ANNOTATION_SCHEMA_VERSION,
            scroll_offset: 0.0,
            highlights: Vec::new(),
            notes: Vec::new(),
            bookmarks: Vec::new(),
        }
    }
}

/// Sidecar path for a document: the full document filename with
/// `.folio-annotations.json` appended.
pub fn annotations_path(document_path: &Path) -> PathBuf {
    let mut path = document_path.to_string_lossy().to_string();
    path.push_str(".folio-annotations.json");
    PathBuf::from(path)
}

/// Write the sidecar atomically (temp file, then rename).
pub fn save_annotations(
    document_path: &Path,
    file: &AnnotationFile,
) -> Result<PathBuf, PersistenceError> {
    let path = annotations_path(document_path);
    let json = serde_json::to_string_pretty(file)?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, &path)?;

    Ok(path)
}

/// Load the sidecar; a missing file is `Ok(None)`, not an error.
pub fn load_annotations(document_path: &Path) -> Result<Option<AnnotationFile>, PersistenceError> {
    let path = annotations_path(document_path);
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path)?;
    let file: AnnotationFile = serde_json::from_str(&json)?;
    Ok(Some(file))
}
