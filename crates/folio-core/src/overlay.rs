//! Overlay renderers: one reconciled visual map per annotation kind.
//!
//! `update` is safe to call from any trigger (scroll, zoom, gesture frame,
//! orientation change, external store mutation): it recomputes the desired
//! visuals, diffs them against the current map by identity, and swaps in
//! the result. Unchanged visuals produce no diff entries, so repeated
//! calls with the same inputs are no-ops.

use crate::gesture::GestureConfig;
use crate::reconcile::{diff_keyed, KeyedDiff};
use canvas_core::{CoordinateMapper, PointF, RectF};
use doc_model::{AnnotationId, Bookmark, Color, Highlight, Note};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightVisual {
    pub rect: RectF,
    pub color: Color,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteVisual {
    pub icon_rect: RectF,
    pub color: Color,
    /// Present only while the note's editor is open.
    pub editor_rect: Option<RectF>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookmarkVisual {
    pub icon_rect: RectF,
    pub color: Color,
}

/// The two transient affordances shown above a selected highlight.
/// Non-interactive as visuals; taps on them are resolved by the gesture
/// controller against these rects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionButtons {
    pub highlight: AnnotationId,
    pub delete_rect: RectF,
    pub recolor_rect: RectF,
}

// Chrome geometry, shared between overlay rendering and gesture
// hit-testing so the two can never disagree about where things are.

pub fn note_icon_rect(anchor: PointF, config: &GestureConfig) -> RectF {
    let half = config.icon_size / 2.0;
    RectF::new(anchor.x - half, anchor.y - half, config.icon_size, config.icon_size)
}

pub fn bookmark_icon_rect(anchor: PointF, config: &GestureConfig) -> RectF {
    note_icon_rect(anchor, config)
}

pub fn note_editor_rect(anchor: PointF, note: &Note, config: &GestureConfig) -> RectF {
    RectF::new(
        anchor.x + config.editor_offset_x,
        anchor.y + config.editor_offset_y,
        note.width,
        note.height,
    )
}

/// Square grab handle on the editor's bottom-right corner.
pub fn editor_resize_handle_rect(editor: RectF, config: &GestureConfig) -> RectF {
    let half = config.resize_handle_size / 2.0;
    RectF::new(
        editor.max_x() - half,
        editor.max_y() - half,
        config.resize_handle_size,
        config.resize_handle_size,
    )
}

/// Canvas rectangle for a highlight with the rendered-height floor applied.
///
/// The floor extends downward from the band's top so a degenerate span
/// still draws something grabbable.
pub fn highlight_rect(
    mapper: &CoordinateMapper<'_>,
    highlight: &Highlight,
    config: &GestureConfig,
) -> RectF {
    let range = canvas_core::PageRange {
        start_page: highlight.start_page,
        start_fraction: highlight.start_fraction,
        end_page: highlight.end_page,
        end_fraction: highlight.end_fraction,
    };
    let rect = mapper.page_range_to_rect(&range);

    if rect.height < config.min_highlight_height {
        RectF::new(rect.x, rect.y, rect.width, config.min_highlight_height)
    } else {
        rect
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightEdge {
    Top,
    Bottom,
}

/// Hit box for a highlight's edge-resize handle.
///
/// Widened on both sides horizontally; vertically the extra reach is
/// biased outward, away from the opposite anchor, so grabbing near an
/// edge errs toward growing the band rather than stealing a body drag.
pub fn edge_handle_rect(rect: RectF, edge: HighlightEdge, config: &GestureConfig) -> RectF {
    let x = rect.min_x() - config.edge_handle_side_slop;
    let width = rect.width + 2.0 * config.edge_handle_side_slop;

    match edge {
        HighlightEdge::Top => RectF::new(
            x,
            rect.min_y() - config.edge_handle_outward,
            width,
            config.edge_handle_outward + config.edge_handle_inward,
        ),
        HighlightEdge::Bottom => RectF::new(
            x,
            rect.max_y() - config.edge_handle_inward,
            width,
            config.edge_handle_outward + config.edge_handle_inward,
        ),
    }
}

/// Delete and recolor button rects, anchored just above the highlight.
pub fn action_button_rects(rect: RectF, config: &GestureConfig) -> (RectF, RectF) {
    let size = config.action_button_size;
    let y = rect.min_y() - config.action_button_gap - size;
    let delete = RectF::new(rect.min_x(), y, size, size);
    let recolor = RectF::new(rect.min_x() + size + config.action_button_gap, y, size, size);
    (delete, recolor)
}

#[derive(Default)]
pub struct HighlightOverlay {
    visuals: HashMap<AnnotationId, HighlightVisual>,
    action_buttons: Option<ActionButtons>,
}

impl HighlightOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        highlights: &HashMap<AnnotationId, Highlight>,
        selection: Option<AnnotationId>,
        mapper: &CoordinateMapper<'_>,
        config: &GestureConfig,
    ) -> KeyedDiff<AnnotationId> {
        let desired: HashMap<AnnotationId, HighlightVisual> = highlights
            .iter()
            .map(|(id, highlight)| {
                (
                    *id,
                    HighlightVisual {
                        rect: highlight_rect(mapper, highlight, config),
                        color: highlight.color,
                        selected: selection == Some(*id),
                    },
                )
            })
            .collect();

        let diff = diff_keyed(&self.visuals, &desired);
        self.visuals = desired;

        self.action_buttons = selection.and_then(|id| {
            highlights.get(&id).map(|highlight| {
                let rect = highlight_rect(mapper, highlight, config);
                let (delete_rect, recolor_rect) = action_button_rects(rect, config);
                ActionButtons { highlight: id, delete_rect, recolor_rect }
            })
        });

        diff
    }

    pub fn visuals(&self) -> &HashMap<AnnotationId, HighlightVisual> {
        &self.visuals
    }

    pub fn visual(&self, id: AnnotationId) -> Option<&HighlightVisual> {
        self.visuals.get(&id)
    }

    pub fn action_buttons(&self) -> Option<&ActionButtons> {
        self.action_buttons.as_ref()
    }
}

#[derive(Default)]
pub struct NoteOverlay {
    visuals: HashMap<AnnotationId, NoteVisual>,
}

impl NoteOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        notes: &HashMap<AnnotationId, Note>,
        mapper: &CoordinateMapper<'_>,
        config: &GestureConfig,
    ) -> KeyedDiff<AnnotationId> {
        let desired: HashMap<AnnotationId, NoteVisual> = notes
            .iter()
            .map(|(id, note)| {
                let anchor = mapper.fraction_to_point(note.page, note.x_fraction, note.y_fraction);
                let editor_rect =
                    note.is_open.then(|| note_editor_rect(anchor, note, config));

                (
                    *id,
                    NoteVisual {
                        icon_rect: note_icon_rect(anchor, config),
                        color: note.color,
                        editor_rect,
                    },
                )
            })
            .collect();

        let diff = diff_keyed(&self.visuals, &desired);
        self.visuals = desired;
        diff
    }

    pub fn visuals(&self) -> &HashMap<AnnotationId, NoteVisual> {
        &self.visuals
    }

    pub fn visual(&self, id: AnnotationId) -> Option<&NoteVisual> {
        self.visuals.get(&id)
    }
}

#[derive(Default)]
pub struct BookmarkOverlay {
    visuals: HashMap<AnnotationId, BookmarkVisual>,
}

impl BookmarkOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        bookmarks: &HashMap<AnnotationId, Bookmark>,
        mapper: &CoordinateMapper<'_>,
        config: &GestureConfig,
    ) -> KeyedDiff<AnnotationId> {
        let desired: HashMap<AnnotationId, BookmarkVisual> = bookmarks
            .iter()
            .map(|(id, bookmark)| {
                let anchor = mapper.fraction_to_point(
                    bookmark.page,
                    bookmark.x_fraction,
                    bookmark.y_fraction,
                );
                (
                    *id,
                    BookmarkVisual {
                        icon_rect: bookmark_icon_rect(anchor, config),
                        color: bookmark.color,
                    },
                )
            })
            .collect();

        let diff = diff_keyed(&self.visuals, &desired);
        self.visuals = desired;
        diff
    }

    pub fn visuals(&self) -> &HashMap<AnnotationId, BookmarkVisual> {
        &self.visuals
    }
}
