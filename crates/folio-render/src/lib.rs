//! Document and page abstractions for rasterization.
//!
//! The canvas never parses documents itself; a host hands it something that
//! can report page sizes and draw a page into an RGBA buffer. Rendering is
//! keyed by the exact on-screen pixel size so cached bitmaps are reused
//! only when they would be pixel-identical.

use canvas_core::SizeF;
use doc_model::{DocumentId, PageSize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page index {index} out of range (page count {page_count})")]
    PageOutOfRange { index: u32, page_count: u32 },
    #[error("requested bitmap has zero pixel dimensions")]
    EmptyTarget,
    #[error("render backend failure: {0}")]
    Backend(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// An opaque, ordered-page document the canvas can rasterize.
///
/// Implementations must be callable from background render workers.
pub trait DocumentSource: Send + Sync {
    fn id(&self) -> DocumentId;

    fn page_count(&self) -> u32;

    /// Intrinsic size of a page in document units.
    fn page_size(&self, index: u32) -> Option<PageSize>;

    /// Draw a page into an RGBA bitmap of exactly the requested pixel size.
    fn render_page(&self, index: u32, pixel_width: u32, pixel_height: u32)
        -> RenderResult<Bitmap>;
}

/// Shared handle to a document, cheap to hand to worker threads.
pub type SharedDocument = Arc<dyn DocumentSource>;

/// Rendered page pixels, RGBA, 4 bytes per pixel.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Bitmap {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self { pixels, width, height }
    }

    /// Solid-fill bitmap, used by placeholder rendering and tests.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            pixels.extend_from_slice(&rgba);
        }
        Self { pixels, width, height }
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// Composite cache key for one rasterization.
///
/// Device scale is stored in hundredths so the key stays `Eq + Hash` while
/// still distinguishing 1x from 2x and fractional scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterKey {
    pub document: DocumentId,
    pub page_index: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub scale_hundredths: u16,
}

impl RasterKey {
    /// Key for rendering a page frame of `frame_size` canvas points at the
    /// given device scale factor.
    pub fn new(document: DocumentId, page_index: u32, frame_size: SizeF, device_scale: f32) -> Self {
        let scale = if device_scale > 0.0 { device_scale } else { 1.0 };

        Self {
            document,
            page_index,
            pixel_width: (frame_size.width.max(0.0) * scale).round() as u32,
            pixel_height: (frame_size.height.max(0.0) * scale).round() as u32,
            scale_hundredths: (scale * 100.0).round() as u16,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_width as usize * self.pixel_height as usize
    }
}

impl Hash for RasterKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.document.hash(state);
        self.page_index.hash(state);
        self.pixel_width.hash(state);
        self.pixel_height.hash(state);
        self.scale_hundredths.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_key_uses_exact_pixel_dimensions() {
        let key = RasterKey::new(DocumentId(7), 3, SizeF::new(300.0, 400.0), 2.0);

        assert_eq!(key.pixel_width, 600);
        assert_eq!(key.pixel_height, 800);
        assert_eq!(key.scale_hundredths, 200);
    }

    #[test]
    fn raster_key_distinguishes_fractional_scales() {
        let size = SizeF::new(100.0, 100.0);
        let one_and_half = RasterKey::new(DocumentId(1), 0, size, 1.5);
        let double = RasterKey::new(DocumentId(1), 0, size, 2.0);

        assert_ne!(one_and_half, double);
        assert_eq!(one_and_half.scale_hundredths, 150);
    }

    #[test]
    fn raster_key_guards_non_positive_scale() {
        let key = RasterKey::new(DocumentId(1), 0, SizeF::new(100.0, 50.0), 0.0);
        assert_eq!(key.scale_hundredths, 100);
        assert_eq!(key.pixel_width, 100);
    }

    #[test]
    fn filled_bitmap_size_matches_dimensions() {
        let bitmap = Bitmap::filled(16, 8, [255, 255, 255, 255]);
        assert_eq!(bitmap.byte_size(), 16 * 8 * 4);
        assert_eq!(bitmap.pixels[3], 255);
    }
}
