//! Gesture interaction state machine.
//!
//! Pointer gestures claim, drag, resize, and commit annotations. The
//! machine is a tagged union with per-state data and a pure transition
//! function `(state, event, ctx) -> (state, effects)`; the controller is a
//! thin stateful wrapper over it so the whole thing tests without a UI
//! harness.
//!
//! During an active gesture the target lives in a working copy here; the
//! canonical store is written only by the `Commit` effect at gesture end.
//! Anchors are recomputed from the delta against the gesture-start
//! snapshot, never the previous frame, so repeated small movements cannot
//! accumulate rounding drift.

use crate::overlay::{
    action_button_rects, bookmark_icon_rect, edge_handle_rect, editor_resize_handle_rect,
    highlight_rect, note_editor_rect, note_icon_rect, HighlightEdge,
};
use crate::store::AnnotationStore;
use canvas_core::{CoordinateMapper, PointF, RectF, SizeF};
use doc_model::{AnnotationId, Bookmark, Highlight, Note};

/// Hit slops, minimum sizes, and chrome dimensions.
///
/// Hit boxes are inflated beyond the visual bounds to ease touch
/// targeting; the values are canvas points.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    pub icon_size: f32,
    pub icon_hit_slop: f32,
    pub highlight_hit_slop: f32,
    pub edge_handle_side_slop: f32,
    pub edge_handle_outward: f32,
    pub edge_handle_inward: f32,
    pub min_highlight_height: f32,
    pub default_band_height: f32,
    pub min_editor_width: f32,
    pub min_editor_height: f32,
    pub resize_handle_size: f32,
    pub editor_offset_x: f32,
    pub editor_offset_y: f32,
    pub action_button_size: f32,
    pub action_button_gap: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            icon_size: 24.0,
            icon_hit_slop: 8.0,
            highlight_hit_slop: 6.0,
            edge_handle_side_slop: 10.0,
            edge_handle_outward: 14.0,
            edge_handle_inward: 6.0,
            min_highlight_height: 16.0,
            default_band_height: 120.0,
            min_editor_width: 120.0,
            min_editor_height: 80.0,
            resize_handle_size: 16.0,
            editor_offset_x: 10.0,
            editor_offset_y: 14.0,
            action_button_size: 28.0,
            action_button_gap: 8.0,
        }
    }
}

/// Transient copy of the annotation being manipulated.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkingCopy {
    Highlight(Highlight),
    Note(Note),
    Bookmark(Bookmark),
}

impl WorkingCopy {
    pub fn id(&self) -> AnnotationId {
        match self {
            WorkingCopy::Highlight(h) => h.id,
            WorkingCopy::Note(n) => n.id,
            WorkingCopy::Bookmark(b) => b.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        start_point: PointF,
        /// Snapshot taken at gesture start; all deltas resolve against it.
        origin: WorkingCopy,
        working: WorkingCopy,
    },
    ResizingHighlight {
        edge: HighlightEdge,
        /// The opposite edge's y, fixed for the whole gesture.
        anchor_y: f32,
        working: Highlight,
    },
    ResizingNoteEditor {
        start_point: PointF,
        start_size: SizeF,
        working: Note,
    },
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle
    }
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }

    /// The live copy overlays should render instead of the stored value.
    pub fn working_copy(&self) -> Option<WorkingCopy> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging { working, .. } => Some(working.clone()),
            GestureState::ResizingHighlight { working, .. } => {
                Some(WorkingCopy::Highlight(working.clone()))
            }
            GestureState::ResizingNoteEditor { working, .. } => {
                Some(WorkingCopy::Note(working.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Began(PointF),
    Changed(PointF),
    Ended(PointF),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    /// Disable the scroll/zoom surface's own recognizers for the gesture.
    LockScroll,
    UnlockScroll,
    /// Push the working copy to the overlay renderers.
    RefreshOverlays,
    /// Write the working copy into the canonical store.
    Commit(WorkingCopy),
    Select(AnnotationId),
    ClearSelection,
    Delete(AnnotationId),
    Recolor(AnnotationId),
    ToggleNoteEditor(AnnotationId),
}

/// Read-only world the transition function hit-tests against.
pub struct GestureContext<'a> {
    pub store: &'a AnnotationStore,
    pub mapper: CoordinateMapper<'a>,
    pub selection: Option<AnnotationId>,
    pub config: &'a GestureConfig,
}

impl<'a> GestureContext<'a> {
    fn note_anchor(&self, note: &Note) -> PointF {
        self.mapper.fraction_to_point(note.page, note.x_fraction, note.y_fraction)
    }

    fn bookmark_anchor(&self, bookmark: &Bookmark) -> PointF {
        self.mapper
            .fraction_to_point(bookmark.page, bookmark.x_fraction, bookmark.y_fraction)
    }
}

/// Pure gesture transition.
pub fn transition(
    state: GestureState,
    event: &GestureEvent,
    ctx: &GestureContext<'_>,
) -> (GestureState, Vec<GestureEffect>) {
    match (state, event) {
        (GestureState::Idle, GestureEvent::Began(point)) => begin(*point, ctx),

        (state @ GestureState::Idle, _) => (state, Vec::new()),

        (state, GestureEvent::Changed(point)) => {
            let next = apply_pointer(state, *point, ctx);
            (next, vec![GestureEffect::RefreshOverlays])
        }

        (state, GestureEvent::Ended(point)) => {
            let finished = apply_pointer(state, *point, ctx);
            end_with(finished)
        }

        (state, GestureEvent::Cancelled) => end_with(state),

        // A second Began while active: the surface never delivers this,
        // but losing the working copy would be worse than ignoring it.
        (state, GestureEvent::Began(_)) => (state, Vec::new()),
    }
}

fn begin(point: PointF, ctx: &GestureContext<'_>) -> (GestureState, Vec<GestureEffect>) {
    let config = ctx.config;
    let slop = config.icon_hit_slop;

    // 1. Open note-editor resize handles.
    for note in ctx.store.notes().values() {
        if !note.is_open {
            continue;
        }
        let editor = note_editor_rect(ctx.note_anchor(note), note, config);
        let handle = editor_resize_handle_rect(editor, config).inset(-slop, -slop);
        if handle.contains(point) {
            let state = GestureState::ResizingNoteEditor {
                start_point: point,
                start_size: SizeF::new(note.width, note.height),
                working: note.clone(),
            };
            return (state, vec![GestureEffect::LockScroll]);
        }
    }

    // 2. Note icons.
    for note in ctx.store.notes().values() {
        let icon = note_icon_rect(ctx.note_anchor(note), config).inset(-slop, -slop);
        if icon.contains(point) {
            let working = WorkingCopy::Note(note.clone());
            let state = GestureState::Dragging {
                start_point: point,
                origin: working.clone(),
                working,
            };
            return (state, vec![GestureEffect::LockScroll]);
        }
    }

    // 3. Bookmark icons.
    for bookmark in ctx.store.bookmarks().values() {
        let icon = bookmark_icon_rect(ctx.bookmark_anchor(bookmark), config).inset(-slop, -slop);
        if icon.contains(point) {
            let working = WorkingCopy::Bookmark(bookmark.clone());
            let state = GestureState::Dragging {
                start_point: point,
                origin: working.clone(),
                working,
            };
            return (state, vec![GestureEffect::LockScroll]);
        }
    }

    // 4. Highlight edge handles.
    for highlight in ctx.store.highlights().values() {
        let rect = highlight_rect(&ctx.mapper, highlight, config);
        for edge in [HighlightEdge::Top, HighlightEdge::Bottom] {
            if edge_handle_rect(rect, edge, config).contains(point) {
                let anchor_y = match edge {
                    HighlightEdge::Top => rect.max_y(),
                    HighlightEdge::Bottom => rect.min_y(),
                };
                let state = GestureState::ResizingHighlight {
                    edge,
                    anchor_y,
                    working: highlight.clone(),
                };
                return (state, vec![GestureEffect::LockScroll]);
            }
        }
    }

    // 5. Highlight bodies.
    for highlight in ctx.store.highlights().values() {
        let body = highlight_rect(&ctx.mapper, highlight, config)
            .inset(-config.highlight_hit_slop, -config.highlight_hit_slop);
        if body.contains(point) {
            let working = WorkingCopy::Highlight(highlight.clone());
            let state = GestureState::Dragging {
                start_point: point,
                origin: working.clone(),
                working,
            };
            return (state, vec![GestureEffect::LockScroll]);
        }
    }

    // Unclaimed: the scroll/zoom surface keeps the gesture.
    (GestureState::Idle, Vec::new())
}

/// Recompute the working copy for the current pointer position.
fn apply_pointer(state: GestureState, point: PointF, ctx: &GestureContext<'_>) -> GestureState {
    match state {
        GestureState::Idle => GestureState::Idle,

        GestureState::Dragging { start_point, origin, .. } => {
            let working = drag_from_origin(&origin, start_point, point, ctx);
            GestureState::Dragging { start_point, origin, working }
        }

        GestureState::ResizingHighlight { edge, anchor_y, working } => {
            let working = resize_highlight(working, anchor_y, point, ctx);
            GestureState::ResizingHighlight { edge, anchor_y, working }
        }

        GestureState::ResizingNoteEditor { start_point, start_size, mut working } => {
            let dx = point.x - start_point.x;
            let dy = point.y - start_point.y;
            working.width = (start_size.width + dx).max(ctx.config.min_editor_width);
            working.height = (start_size.height + dy).max(ctx.config.min_editor_height);
            GestureState::ResizingNoteEditor { start_point, start_size, working }
        }
    }
}

fn end_with(state: GestureState) -> (GestureState, Vec<GestureEffect>) {
    match state.working_copy() {
        None => (GestureState::Idle, Vec::new()),
        Some(working) => (
            GestureState::Idle,
            vec![
                GestureEffect::Commit(working),
                GestureEffect::RefreshOverlays,
                GestureEffect::UnlockScroll,
            ],
        ),
    }
}

fn drag_from_origin(
    origin: &WorkingCopy,
    start_point: PointF,
    point: PointF,
    ctx: &GestureContext<'_>,
) -> WorkingCopy {
    let dx = point.x - start_point.x;
    let dy = point.y - start_point.y;
    let bounds = ctx.mapper.canvas_bounds();

    match origin {
        WorkingCopy::Note(origin_note) => {
            let anchor = ctx.note_anchor(origin_note);
            let moved = bounds.clamp_point(PointF::new(anchor.x + dx, anchor.y + dy));
            let mapped = ctx.mapper.point_to_page_fraction(moved);

            let mut note = origin_note.clone();
            note.page = mapped.page;
            note.x_fraction = mapped.x_fraction;
            note.y_fraction = mapped.y_fraction;
            WorkingCopy::Note(note)
        }

        WorkingCopy::Bookmark(origin_bookmark) => {
            let anchor = ctx.bookmark_anchor(origin_bookmark);
            let moved = bounds.clamp_point(PointF::new(anchor.x + dx, anchor.y + dy));
            let mapped = ctx.mapper.point_to_page_fraction(moved);

            let mut bookmark = origin_bookmark.clone();
            bookmark.page = mapped.page;
            bookmark.x_fraction = mapped.x_fraction;
            bookmark.y_fraction = mapped.y_fraction;
            WorkingCopy::Bookmark(bookmark)
        }

        WorkingCopy::Highlight(origin_highlight) => {
            let range = canvas_core::PageRange {
                start_page: origin_highlight.start_page,
                start_fraction: origin_highlight.start_fraction,
                end_page: origin_highlight.end_page,
                end_fraction: origin_highlight.end_fraction,
            };
            let rect = ctx.mapper.page_range_to_rect(&range);

            // A band moves vertically only; clamp so it stays on-canvas.
            let max_top = (bounds.max_y() - rect.height).max(bounds.min_y());
            let new_top = (rect.min_y() + dy).clamp(bounds.min_y(), max_top);
            let shifted = rect.offset(0.0, new_top - rect.min_y());
            let mapped = ctx.mapper.rect_to_page_range(shifted);

            let mut highlight = origin_highlight.clone();
            highlight.start_page = mapped.start_page;
            highlight.start_fraction = mapped.start_fraction;
            highlight.end_page = mapped.end_page;
            highlight.end_fraction = mapped.end_fraction;
            highlight.clamp_fractions();
            WorkingCopy::Highlight(highlight)
        }
    }
}

fn resize_highlight(
    mut working: Highlight,
    anchor_y: f32,
    point: PointF,
    ctx: &GestureContext<'_>,
) -> Highlight {
    let bounds = ctx.mapper.canvas_bounds();
    let pointer_y = point.y.clamp(bounds.min_y(), bounds.max_y());

    let mut min_y = anchor_y.min(pointer_y);
    let mut max_y = anchor_y.max(pointer_y);

    // The grabbed edge chases the pointer; the opposite edge stays put.
    // Floor the height away from the anchor so the band cannot collapse.
    if max_y - min_y < ctx.config.min_highlight_height {
        if pointer_y >= anchor_y {
            max_y = min_y + ctx.config.min_highlight_height;
        } else {
            min_y = max_y - ctx.config.min_highlight_height;
        }
    }

    let band = RectF::new(bounds.min_x(), min_y, bounds.width, max_y - min_y);
    let mapped = ctx.mapper.rect_to_page_range(band);

    working.start_page = mapped.start_page;
    working.start_fraction = mapped.start_fraction;
    working.end_page = mapped.end_page;
    working.end_fraction = mapped.end_fraction;
    working.clamp_fractions();
    working
}

/// Tap resolution, independent of the drag/resize machine.
///
/// Returns whether this controller claimed the tap; an unclaimed tap goes
/// to whatever is underneath (the scroll surface, or an open editor).
pub fn handle_tap(point: PointF, ctx: &GestureContext<'_>) -> (bool, Vec<GestureEffect>) {
    let config = ctx.config;
    let slop = config.icon_hit_slop;

    // Selected highlight's action hot-zones come first; they float above
    // everything else.
    if let Some(selected) = ctx.selection {
        if let Some(highlight) = ctx.store.highlight(selected) {
            let rect = highlight_rect(&ctx.mapper, highlight, config);
            let (delete_rect, recolor_rect) = action_button_rects(rect, config);

            if delete_rect.inset(-slop, -slop).contains(point) {
                return (true, vec![GestureEffect::Delete(selected), GestureEffect::ClearSelection]);
            }
            if recolor_rect.inset(-slop, -slop).contains(point) {
                return (
                    true,
                    vec![GestureEffect::Recolor(selected), GestureEffect::ClearSelection],
                );
            }
        }
    }

    // A tap inside an open editor belongs to the editor widget, not us.
    for note in ctx.store.notes().values() {
        if !note.is_open {
            continue;
        }
        let editor = note_editor_rect(ctx.note_anchor(note), note, config);
        if editor.contains(point) {
            return (false, Vec::new());
        }
    }

    for note in ctx.store.notes().values() {
        let icon = note_icon_rect(ctx.note_anchor(note), config).inset(-slop, -slop);
        if icon.contains(point) {
            return (true, vec![GestureEffect::ToggleNoteEditor(note.id)]);
        }
    }

    for bookmark in ctx.store.bookmarks().values() {
        let icon = bookmark_icon_rect(ctx.bookmark_anchor(bookmark), config).inset(-slop, -slop);
        if icon.contains(point) {
            return (true, Vec::new());
        }
    }

    for highlight in ctx.store.highlights().values() {
        let body = highlight_rect(&ctx.mapper, highlight, config)
            .inset(-config.highlight_hit_slop, -config.highlight_hit_slop);
        if body.contains(point) {
            return (true, vec![GestureEffect::Select(highlight.id)]);
        }
    }

    // Empty canvas: clear any highlight selection, let the tap through.
    (false, vec![GestureEffect::ClearSelection])
}

/// Stateful wrapper over the pure transition, for hosts that drive the
/// machine directly.
#[derive(Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn working_copy(&self) -> Option<WorkingCopy> {
        self.state.working_copy()
    }

    pub fn handle_event(
        &mut self,
        event: &GestureEvent,
        ctx: &GestureContext<'_>,
    ) -> Vec<GestureEffect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(state, event, ctx);
        self.state = next;
        effects
    }
}
