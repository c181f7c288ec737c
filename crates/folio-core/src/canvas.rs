//! The document canvas controller.
//!
//! Owns layout, the annotation store, the overlay renderers, the gesture
//! state, and the raster service, and routes effects between them. All of
//! it runs on one UI-affine thread; the only concurrency is inside the
//! raster service, which marshals worker results back here.

use crate::error::CanvasError;
use crate::gesture::{
    self, GestureConfig, GestureContext, GestureEffect, GestureEvent, GestureState, WorkingCopy,
};
use crate::overlay::{BookmarkOverlay, HighlightOverlay, NoteOverlay};
use crate::persistence::{self, AnnotationFile};
use crate::raster::RasterService;
use crate::store::AnnotationStore;
use canvas_core::{compute_layout, CoordinateMapper, PageLayout, PointF, RectF, SizeF};
use doc_model::{AnnotationId, Bookmark, Color, DocumentId, Highlight, Note, PageSize};
use folio_cache::CacheConfig;
use folio_render::SharedDocument;
use folio_scheduler::{RenderPriority, WorkerPoolConfig};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Recolor cycles through this palette in order.
const HIGHLIGHT_PALETTE: [Color; 4] = [
    Color::HIGHLIGHT_YELLOW,
    Color { r: 105, g: 240, b: 174, a: 128 },
    Color { r: 130, g: 177, b: 255, a: 128 },
    Color { r: 255, g: 128, b: 171, a: 128 },
];

#[derive(Debug, Clone)]
pub struct DocumentDescriptor {
    pub id: DocumentId,
    pub page_sizes: Vec<PageSize>,
    /// Where the document lives on disk; the annotation sidecar is derived
    /// from it. `None` disables persistence (e.g. previews).
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    AnnotationsChanged,
    /// Navigate the scroll surface to this content offset.
    ScrollTo(f32),
    /// The scroll surface's own gesture recognition was enabled/disabled.
    ScrollLockChanged(bool),
    /// A page bitmap became available; repaint that page.
    PageReady(u32),
}

#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub gesture: GestureConfig,
    pub cache: CacheConfig,
    pub workers: WorkerPoolConfig,
    pub device_scale: f32,
    /// Pages beyond the visible range to render speculatively.
    pub prefetch_radius: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            cache: CacheConfig::default(),
            workers: WorkerPoolConfig::default(),
            device_scale: 1.0,
            prefetch_radius: 1,
        }
    }
}

/// Commands that arrived while canvas bounds were degenerate; replayed as
/// soon as valid bounds come in.
enum PendingCommand {
    CreateHighlightAtCenter,
    CreateNoteAtCenter,
    CreateBookmarkAtCenter(String),
}

pub struct DocumentCanvas {
    config: CanvasConfig,
    bounds: SizeF,
    content_top_inset: f32,
    scroll_offset: f32,
    document: Option<DocumentDescriptor>,
    layout: Option<PageLayout>,
    store: AnnotationStore,
    selection: Option<AnnotationId>,
    gesture: GestureState,
    highlight_overlay: HighlightOverlay,
    note_overlay: NoteOverlay,
    bookmark_overlay: BookmarkOverlay,
    raster: RasterService,
    pending: VecDeque<PendingCommand>,
    events: Vec<CanvasEvent>,
    scroll_locked: bool,
}

impl DocumentCanvas {
    pub fn new(config: CanvasConfig) -> Self {
        let raster =
            RasterService::new(config.cache.clone(), config.workers.clone(), config.device_scale);

        Self {
            config,
            bounds: SizeF::default(),
            content_top_inset: 0.0,
            scroll_offset: 0.0,
            document: None,
            layout: None,
            store: AnnotationStore::new(),
            selection: None,
            gesture: GestureState::Idle,
            highlight_overlay: HighlightOverlay::new(),
            note_overlay: NoteOverlay::new(),
            bookmark_overlay: BookmarkOverlay::new(),
            raster,
            pending: VecDeque::new(),
            events: Vec::new(),
            scroll_locked: false,
        }
    }

    // Geometry and lifecycle -------------------------------------------------

    /// Container bounds changed (window resize, rotation, split view).
    /// Relayouts and replays any commands deferred on degenerate bounds.
    /// Zoom is a transform on the scroll surface and does not come here.
    pub fn set_bounds(&mut self, bounds: SizeF) {
        self.bounds = bounds;

        if bounds.is_degenerate() {
            return;
        }

        self.relayout();
        self.flush_pending();
        self.refresh_overlays();
    }

    pub fn set_content_top_inset(&mut self, inset: f32) {
        self.content_top_inset = inset.max(0.0);
    }

    /// Swap the displayed document.
    ///
    /// The annotation sidecar is loaded first; if that fails the canvas is
    /// left untouched, still showing the previous document. On success the
    /// raster cache is cleared in full and a new render generation starts.
    pub fn set_document(
        &mut self,
        descriptor: DocumentDescriptor,
        source: Option<SharedDocument>,
    ) -> Result<(), CanvasError> {
        let loaded = match &descriptor.path {
            Some(path) => persistence::load_annotations(path)
                .map_err(|error| CanvasError::DocumentLoadFailure(error.to_string()))?,
            None => None,
        };

        self.raster.set_document(source);
        self.document = Some(descriptor);
        self.layout = None;
        self.selection = None;
        self.gesture = GestureState::Idle;
        self.set_scroll_locked(false);

        let file = loaded.unwrap_or_default();
        self.scroll_offset = file.scroll_offset;
        self.store.replace_all(file.highlights, file.notes, file.bookmarks);

        self.relayout();
        self.refresh_overlays();
        self.events.push(CanvasEvent::AnnotationsChanged);
        Ok(())
    }

    fn relayout(&mut self) {
        if self.bounds.is_degenerate() {
            self.layout = None;
            return;
        }
        if let Some(document) = &self.document {
            self.layout = Some(compute_layout(&document.page_sizes, self.bounds.width));
        }
    }

    /// Force a synchronous layout pass; create/position requests call this
    /// so they never compute coordinates against missing frames.
    fn ensure_layout(&mut self) {
        if self.layout.is_none() {
            self.relayout();
        }
    }

    fn flush_pending(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            let result = match command {
                PendingCommand::CreateHighlightAtCenter => {
                    self.create_highlight_at_center().map(|_| ())
                }
                PendingCommand::CreateNoteAtCenter => self.create_note_at_center().map(|_| ()),
                PendingCommand::CreateBookmarkAtCenter(name) => {
                    self.create_bookmark_at_center(&name).map(|_| ())
                }
            };

            // Bounds went degenerate again mid-flush; the command has been
            // re-queued by the create call, stop replaying.
            if result.is_err() {
                break;
            }
        }
    }

    // Annotation creation ----------------------------------------------------

    pub fn create_highlight_at_center(&mut self) -> Result<AnnotationId, CanvasError> {
        if self.bounds.is_degenerate() {
            self.pending.push_back(PendingCommand::CreateHighlightAtCenter);
            return Err(CanvasError::LayoutNotReady);
        }
        let center = self.viewport_center();
        self.create_highlight_at(center)
    }

    /// Create a highlight band starting at `point` and extending down by
    /// the default band height.
    pub fn create_highlight_at(&mut self, point: PointF) -> Result<AnnotationId, CanvasError> {
        if self.bounds.is_degenerate() {
            self.pending.push_back(PendingCommand::CreateHighlightAtCenter);
            return Err(CanvasError::LayoutNotReady);
        }
        self.ensure_layout();

        let band = RectF::new(
            0.0,
            point.y,
            self.bounds.width,
            self.config.gesture.default_band_height,
        );
        let range = self.mapper().rect_to_page_range(band);
        let highlight = Highlight::new(
            range.start_page,
            range.start_fraction,
            range.end_page,
            range.end_fraction,
        );
        let id = highlight.id;
        self.store.upsert_highlight(highlight);
        self.after_store_mutation();
        Ok(id)
    }

    pub fn create_note_at_center(&mut self) -> Result<AnnotationId, CanvasError> {
        if self.bounds.is_degenerate() {
            self.pending.push_back(PendingCommand::CreateNoteAtCenter);
            return Err(CanvasError::LayoutNotReady);
        }
        let center = self.viewport_center();
        self.create_note_at(center)
    }

    pub fn create_note_at(&mut self, point: PointF) -> Result<AnnotationId, CanvasError> {
        if self.bounds.is_degenerate() {
            self.pending.push_back(PendingCommand::CreateNoteAtCenter);
            return Err(CanvasError::LayoutNotReady);
        }
        self.ensure_layout();

        let anchor = self.mapper().point_to_page_fraction(point);
        let note = Note::new(anchor.page, anchor.x_fraction, anchor.y_fraction);
        let id = note.id;
        self.store.upsert_note(note);
        self.after_store_mutation();
        Ok(id)
    }

    pub fn create_bookmark_at_center(&mut self, name: &str) -> Result<AnnotationId, CanvasError> {
        if self.bounds.is_degenerate() {
            self.pending
                .push_back(PendingCommand::CreateBookmarkAtCenter(name.to_owned()));
            return Err(CanvasError::LayoutNotReady);
        }
        let center = self.viewport_center();
        self.ensure_layout();

        let anchor = self.mapper().point_to_page_fraction(center);
        let bookmark = Bookmark::new(anchor.page, anchor.x_fraction, anchor.y_fraction, name);
        let id = bookmark.id;
        self.store.upsert_bookmark(bookmark);
        self.after_store_mutation();
        Ok(id)
    }

    // Navigation and scrolling ----------------------------------------------

    /// Scroll so the annotation's anchor sits mid-viewport.
    pub fn scroll_to_annotation(&mut self, id: AnnotationId) -> bool {
        self.ensure_layout();

        let target_y = if let Some(highlight) = self.store.highlight(id) {
            self.mapper()
                .fraction_to_point(highlight.start_page, 0.5, highlight.start_fraction)
                .y
        } else if let Some(note) = self.store.note(id) {
            self.mapper().fraction_to_point(note.page, note.x_fraction, note.y_fraction).y
        } else if let Some(bookmark) = self.store.bookmark(id) {
            self.mapper()
                .fraction_to_point(bookmark.page, bookmark.x_fraction, bookmark.y_fraction)
                .y
        } else {
            return false;
        };

        let total_height = self.layout.as_ref().map(|l| l.total_height).unwrap_or(0.0);
        let max_offset = (total_height - self.bounds.height).max(0.0);
        let offset = (target_y - self.bounds.height / 2.0).clamp(0.0, max_offset);

        self.set_scroll_offset(offset);
        self.events.push(CanvasEvent::ScrollTo(offset));
        true
    }

    /// Scroll offset is the one continuously-persisted field: cheap, and
    /// written regardless of gesture state.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset.max(0.0);
        self.save_annotations();
    }

    // Pointer gestures -------------------------------------------------------

    /// Feed a pointer gesture event. Returns whether this canvas claimed
    /// it; unclaimed events belong to the scroll/zoom surface.
    pub fn pointer_event(&mut self, event: GestureEvent) -> bool {
        self.ensure_layout();

        let state = std::mem::take(&mut self.gesture);
        let (next, effects) = {
            let ctx = self.gesture_context();
            gesture::transition(state, &event, &ctx)
        };
        self.gesture = next;

        let claimed = self.gesture.is_active() || !effects.is_empty();
        self.apply_effects(effects);
        claimed
    }

    /// Resolve a tap (non-drag touch). Unclaimed taps fall through to the
    /// surface underneath, including open note editors.
    pub fn tap(&mut self, point: PointF) -> bool {
        self.ensure_layout();

        let (claimed, effects) = {
            let ctx = self.gesture_context();
            gesture::handle_tap(point, &ctx)
        };
        self.apply_effects(effects);
        claimed
    }

    fn apply_effects(&mut self, effects: Vec<GestureEffect>) {
        for effect in effects {
            match effect {
                GestureEffect::LockScroll => self.set_scroll_locked(true),
                GestureEffect::UnlockScroll => self.set_scroll_locked(false),
                GestureEffect::RefreshOverlays => self.refresh_overlays(),
                GestureEffect::Commit(working) => {
                    self.store.commit(working);
                    self.after_store_mutation();
                }
                GestureEffect::Select(id) => {
                    if self.selection != Some(id) {
                        self.selection = Some(id);
                        self.refresh_overlays();
                    }
                }
                GestureEffect::ClearSelection => {
                    if self.selection.is_some() {
                        self.selection = None;
                        self.refresh_overlays();
                    }
                }
                GestureEffect::Delete(id) => {
                    if self.store.remove(id) {
                        self.after_store_mutation();
                    }
                }
                GestureEffect::Recolor(id) => {
                    if let Some(highlight) = self.store.highlight(id) {
                        let next = next_highlight_color(highlight.color);
                        self.store.set_highlight_color(id, next);
                        self.after_store_mutation();
                    }
                }
                GestureEffect::ToggleNoteEditor(id) => {
                    if let Some(note) = self.store.note_mut(id) {
                        note.is_open = !note.is_open;
                        self.after_store_mutation();
                    }
                }
            }
        }
    }

    fn after_store_mutation(&mut self) {
        self.events.push(CanvasEvent::AnnotationsChanged);
        self.save_annotations();
        self.refresh_overlays();
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        if self.scroll_locked != locked {
            self.scroll_locked = locked;
            self.events.push(CanvasEvent::ScrollLockChanged(locked));
        }
    }

    // Rasterization ----------------------------------------------------------

    /// Queue renders for every page intersecting the viewport, plus the
    /// configured prefetch radius on either side.
    pub fn request_visible_pages(&mut self) {
        let Some(layout) = &self.layout else {
            return;
        };

        let viewport_top = self.scroll_offset;
        let viewport_bottom = self.scroll_offset + self.bounds.height;

        let mut visible: Option<(u32, u32)> = None;
        for (index, frame) in layout.frames.iter().enumerate() {
            if frame.max_y() >= viewport_top && frame.min_y() <= viewport_bottom {
                let index = index as u32;
                visible = Some(match visible {
                    None => (index, index),
                    Some((first, _)) => (first, index),
                });
            }
        }

        let Some((first, last)) = visible else {
            return;
        };
        let page_count = layout.frames.len() as u32;
        let radius = self.config.prefetch_radius;
        let prefetch_first = first.saturating_sub(radius);
        let prefetch_last = (last + radius).min(page_count.saturating_sub(1));

        for index in prefetch_first..=prefetch_last {
            let Some(frame) = layout.frames.get(index as usize) else {
                continue;
            };
            let priority = if (first..=last).contains(&index) {
                RenderPriority::Visible
            } else {
                RenderPriority::Prefetch
            };
            self.raster.request(index, frame.size(), priority);
        }
    }

    /// Cached bitmap for a page at its current frame size, queueing a
    /// render on miss.
    pub fn page_bitmap(&mut self, page: u32) -> Option<std::sync::Arc<folio_render::Bitmap>> {
        let frame_size = self.layout.as_ref()?.frame(page)?.size();
        self.raster.request(page, frame_size, RenderPriority::Visible)
    }

    /// Drain finished renders; emits `PageReady` for each applied bitmap.
    pub fn poll_render_results(&mut self) {
        for key in self.raster.poll_completions() {
            self.events.push(CanvasEvent::PageReady(key.page_index));
        }
    }

    // Overlays ---------------------------------------------------------------

    /// Recompute all three overlays from the canonical store, with the
    /// gesture's working copy (if any) overriding its stored counterpart.
    fn refresh_overlays(&mut self) {
        let mut highlights = self.store.highlights().clone();
        let mut notes = self.store.notes().clone();
        let mut bookmarks = self.store.bookmarks().clone();

        match self.gesture.working_copy() {
            Some(WorkingCopy::Highlight(highlight)) => {
                highlights.insert(highlight.id, highlight);
            }
            Some(WorkingCopy::Note(note)) => {
                notes.insert(note.id, note);
            }
            Some(WorkingCopy::Bookmark(bookmark)) => {
                bookmarks.insert(bookmark.id, bookmark);
            }
            None => {}
        }

        let bounds_rect = RectF::from_size(self.bounds);
        let mapper = match &self.layout {
            Some(layout) => CoordinateMapper::new(layout, bounds_rect),
            None => CoordinateMapper::without_layout(bounds_rect),
        };

        self.highlight_overlay.update(&highlights, self.selection, &mapper, &self.config.gesture);
        self.note_overlay.update(&notes, &mapper, &self.config.gesture);
        self.bookmark_overlay.update(&bookmarks, &mapper, &self.config.gesture);
    }

    // Persistence ------------------------------------------------------------

    fn save_annotations(&self) {
        let Some(document) = &self.document else {
            return;
        };
        let Some(path) = &document.path else {
            return;
        };

        let file = AnnotationFile {
            scroll_offset: self.scroll_offset,
            highlights: self.store.highlights().values().cloned().collect(),
            notes: self.store.notes().values().cloned().collect(),
            bookmarks: self.store.bookmarks().values().cloned().collect(),
            ..AnnotationFile::default()
        };

        // In-memory state stays authoritative; a failed save is logged and
        // retried implicitly on the next commit.
        if let Err(error) = persistence::save_annotations(path, &file) {
            log::warn!("failed to save annotations for {}: {error}", path.display());
        }
    }

    // Helpers and accessors --------------------------------------------------

    fn viewport_center(&self) -> PointF {
        PointF::new(self.bounds.width / 2.0, self.scroll_offset + self.bounds.height / 2.0)
    }

    fn mapper(&self) -> CoordinateMapper<'_> {
        let bounds = RectF::from_size(self.bounds);
        match &self.layout {
            Some(layout) => CoordinateMapper::new(layout, bounds),
            None => CoordinateMapper::without_layout(bounds),
        }
    }

    fn gesture_context(&self) -> GestureContext<'_> {
        GestureContext {
            store: &self.store,
            mapper: self.mapper(),
            selection: self.selection,
            config: &self.config.gesture,
        }
    }

    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn selection(&self) -> Option<AnnotationId> {
        self.selection
    }

    pub fn gesture_state(&self) -> &GestureState {
        &self.gesture
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn content_top_inset(&self) -> f32 {
        self.content_top_inset
    }

    pub fn bounds(&self) -> SizeF {
        self.bounds
    }

    pub fn layout(&self) -> Option<&PageLayout> {
        self.layout.as_ref()
    }

    pub fn highlight_overlay(&self) -> &HighlightOverlay {
        &self.highlight_overlay
    }

    pub fn note_overlay(&self) -> &NoteOverlay {
        &self.note_overlay
    }

    pub fn bookmark_overlay(&self) -> &BookmarkOverlay {
        &self.bookmark_overlay
    }

    pub fn raster(&self) -> &RasterService {
        &self.raster
    }
}

fn next_highlight_color(current: Color) -> Color {
    let position = HIGHLIGHT_PALETTE.iter().position(|candidate| *candidate == current);
    match position {
        Some(index) => HIGHLIGHT_PALETTE[(index + 1) % HIGHLIGHT_PALETTE.len()],
        None => HIGHLIGHT_PALETTE[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> CanvasConfig {
        CanvasConfig {
            workers: WorkerPoolConfig::new(1).with_poll_interval(Duration::from_millis(1)),
            ..CanvasConfig::default()
        }
    }

    fn descriptor(pages: usize) -> DocumentDescriptor {
        DocumentDescriptor {
            id: DocumentId(1),
            page_sizes: vec![PageSize::new(600.0, 800.0); pages],
            path: None,
        }
    }

    fn canvas_with_document(pages: usize) -> DocumentCanvas {
        let mut canvas = DocumentCanvas::new(test_config());
        canvas.set_bounds(SizeF::new(300.0, 400.0));
        canvas.set_document(descriptor(pages), None).expect("document load expected");
        canvas
    }

    #[test]
    fn create_with_degenerate_bounds_defers_until_resize() {
        let mut canvas = DocumentCanvas::new(test_config());
        canvas.set_document(descriptor(2), None).expect("document load expected");

        let result = canvas.create_note_at_center();
        assert!(matches!(result, Err(CanvasError::LayoutNotReady)));
        assert!(canvas.store().is_empty());

        // Valid bounds replay the deferred creation.
        canvas.set_bounds(SizeF::new(300.0, 400.0));
        assert_eq!(canvas.store().notes().len(), 1);
    }

    #[test]
    fn create_highlight_before_layout_forces_layout_pass() {
        let mut canvas = DocumentCanvas::new(test_config());
        canvas.set_document(descriptor(1), None).expect("document load expected");

        // Bounds arrive but no explicit layout pass has been requested
        // before the create call.
        canvas.bounds = SizeF::new(300.0, 400.0);
        canvas.layout = None;

        let id = canvas.create_highlight_at(PointF::new(150.0, 100.0)).expect("create expected");
        assert!(canvas.layout().is_some());

        let highlight = canvas.store().highlight(id).expect("highlight expected");
        assert_eq!(highlight.start_page, 0);
        assert!((highlight.start_fraction - 0.25).abs() < 1e-4);
    }

    #[test]
    fn tap_select_then_delete_via_action_button() {
        let mut canvas = canvas_with_document(1);
        let id = canvas.create_highlight_at(PointF::new(0.0, 100.0)).expect("create expected");

        assert!(canvas.tap(PointF::new(150.0, 150.0)));
        assert_eq!(canvas.selection(), Some(id));

        let buttons = *canvas
            .highlight_overlay()
            .action_buttons()
            .expect("action buttons expected");
        assert!(canvas.tap(buttons.delete_rect.center()));

        assert_eq!(canvas.selection(), None);
        assert!(canvas.store().highlight(id).is_none());
        assert!(canvas.highlight_overlay().visuals().is_empty());
    }

    #[test]
    fn recolor_cycles_palette_and_clears_selection() {
        let mut canvas = canvas_with_document(1);
        let id = canvas.create_highlight_at(PointF::new(0.0, 100.0)).expect("create expected");

        canvas.tap(PointF::new(150.0, 150.0));
        let buttons = *canvas
            .highlight_overlay()
            .action_buttons()
            .expect("action buttons expected");
        canvas.tap(buttons.recolor_rect.center());

        let highlight = canvas.store().highlight(id).expect("highlight expected");
        assert_eq!(highlight.color, HIGHLIGHT_PALETTE[1]);
        assert_eq!(canvas.selection(), None);
    }

    #[test]
    fn claimed_drag_locks_scroll_for_its_duration() {
        let mut canvas = canvas_with_document(1);
        let id = canvas.create_note_at(PointF::new(150.0, 100.0)).expect("create expected");

        assert!(canvas.pointer_event(GestureEvent::Began(PointF::new(150.0, 100.0))));
        assert!(canvas.scroll_locked());

        canvas.pointer_event(GestureEvent::Changed(PointF::new(150.0, 200.0)));
        assert!(canvas.scroll_locked());

        canvas.pointer_event(GestureEvent::Ended(PointF::new(150.0, 200.0)));
        assert!(!canvas.scroll_locked());

        let note = canvas.store().note(id).expect("note expected");
        assert!((note.y_fraction - 0.5).abs() < 1e-4);
    }

    #[test]
    fn unclaimed_gesture_leaves_scroll_enabled() {
        let mut canvas = canvas_with_document(1);

        assert!(!canvas.pointer_event(GestureEvent::Began(PointF::new(10.0, 10.0))));
        assert!(!canvas.scroll_locked());

        let events = canvas.take_events();
        assert!(!events.contains(&CanvasEvent::ScrollLockChanged(true)));
    }

    #[test]
    fn scroll_to_annotation_centers_its_anchor() {
        let mut canvas = canvas_with_document(4);
        // Pages are 400 tall; a note on page 2 at y_fraction 0.5 sits at
        // canvas y = 1000.
        let id = canvas.create_note_at(PointF::new(150.0, 1000.0)).expect("create expected");

        assert!(canvas.scroll_to_annotation(id));
        assert_eq!(canvas.scroll_offset(), 800.0);
        assert!(canvas.take_events().contains(&CanvasEvent::ScrollTo(800.0)));

        assert!(!canvas.scroll_to_annotation(AnnotationId::new_v4()));
    }

    #[test]
    fn toggle_note_editor_via_tap() {
        let mut canvas = canvas_with_document(1);
        let id = canvas.create_note_at(PointF::new(150.0, 200.0)).expect("create expected");

        assert!(canvas.tap(PointF::new(150.0, 200.0)));
        assert!(canvas.store().note(id).expect("note expected").is_open);
        assert!(canvas
            .note_overlay()
            .visual(id)
            .expect("visual expected")
            .editor_rect
            .is_some());

        // A tap inside the open editor is not claimed by the canvas.
        let editor = canvas
            .note_overlay()
            .visual(id)
            .expect("visual expected")
            .editor_rect
            .expect("editor rect expected");
        assert!(!canvas.tap(editor.center()));
        assert!(canvas.store().note(id).expect("note expected").is_open);
    }

    #[test]
    fn next_color_wraps_and_recovers_unknown_colors() {
        let last = HIGHLIGHT_PALETTE[HIGHLIGHT_PALETTE.len() - 1];
        assert_eq!(next_highlight_color(last), HIGHLIGHT_PALETTE[0]);
        assert_eq!(next_highlight_color(Color::rgb(1, 2, 3)), HIGHLIGHT_PALETTE[0]);
    }
}
