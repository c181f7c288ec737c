//! Canonical annotation collections.
//!
//! The store is the single source of truth; during an active gesture the
//! controller mutates a working copy held elsewhere and commits it here
//! only at gesture end. Non-positional edits (color, text, delete) land
//! immediately.

use crate::gesture::WorkingCopy;
use doc_model::{AnnotationId, Bookmark, Color, Highlight, Note};
use std::collections::HashMap;

#[derive(Default)]
pub struct AnnotationStore {
    highlights: HashMap<AnnotationId, Highlight>,
    notes: HashMap<AnnotationId, Note>,
    bookmarks: HashMap<AnnotationId, Bookmark>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a highlight.
    ///
    /// Fractions are clamped and an inverted page range is normalized so
    /// every stored highlight reads start-before-end, whatever order the
    /// gesture math produced.
    pub fn upsert_highlight(&mut self, mut highlight: Highlight) {
        highlight.clamp_fractions();
        if !highlight.is_ordered() {
            std::mem::swap(&mut highlight.start_page, &mut highlight.end_page);
            std::mem::swap(&mut highlight.start_fraction, &mut highlight.end_fraction);
        }
        self.highlights.insert(highlight.id, highlight);
    }

    pub fn upsert_note(&mut self, mut note: Note) {
        note.clamp_fractions();
        self.notes.insert(note.id, note);
    }

    pub fn upsert_bookmark(&mut self, mut bookmark: Bookmark) {
        bookmark.clamp_fractions();
        self.bookmarks.insert(bookmark.id, bookmark);
    }

    /// Commit a gesture working copy into the canonical collections.
    pub fn commit(&mut self, working: WorkingCopy) {
        match working {
            WorkingCopy::Highlight(highlight) => self.upsert_highlight(highlight),
            WorkingCopy::Note(note) => self.upsert_note(note),
            WorkingCopy::Bookmark(bookmark) => self.upsert_bookmark(bookmark),
        }
    }

    /// Remove an annotation of any kind. Removing a note tears down its
    /// attached editor with it, since the editor exists only as note state.
    pub fn remove(&mut self, id: AnnotationId) -> bool {
        self.highlights.remove(&id).is_some()
            || self.notes.remove(&id).is_some()
            || self.bookmarks.remove(&id).is_some()
    }

    pub fn highlight(&self, id: AnnotationId) -> Option<&Highlight> {
        self.highlights.get(&id)
    }

    pub fn note(&self, id: AnnotationId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn bookmark(&self, id: AnnotationId) -> Option<&Bookmark> {
        self.bookmarks.get(&id)
    }

    pub fn note_mut(&mut self, id: AnnotationId) -> Option<&mut Note> {
        self.notes.get_mut(&id)
    }

    pub fn set_highlight_color(&mut self, id: AnnotationId, color: Color) -> bool {
        match self.highlights.get_mut(&id) {
            Some(highlight) => {
                highlight.color = color;
                true
            }
            None => false,
        }
    }

    pub fn set_note_text(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        match self.notes.get_mut(&id) {
            Some(note) => {
                note.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn highlights(&self) -> &HashMap<AnnotationId, Highlight> {
        &self.highlights
    }

    pub fn notes(&self) -> &HashMap<AnnotationId, Note> {
        &self.notes
    }

    pub fn bookmarks(&self) -> &HashMap<AnnotationId, Bookmark> {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.highlights.len() + self.notes.len() + self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.highlights.clear();
        self.notes.clear();
        self.bookmarks.clear();
    }

    /// Replace the whole store, used when a document's saved annotations
    /// are loaded.
    pub fn replace_all(
        &mut self,
        highlights: Vec<Highlight>,
        notes: Vec<Note>,
        bookmarks: Vec<Bookmark>,
    ) {
        self.clear();
        for highlight in highlights {
            self.upsert_highlight(highlight);
        }
        for note in notes {
            self.upsert_note(note);
        }
        for bookmark in bookmarks {
            self.upsert_bookmark(bookmark);
        }
    }
}
