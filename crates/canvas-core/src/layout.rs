use crate::geometry::RectF;
use doc_model::PageSize;

/// Page frames computed for one target width.
///
/// Frames are indexed by page and stack gaplessly from y=0. The layout is
/// a pure function of its inputs, so frames double as cache keys and
/// coordinate anchors elsewhere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub frames: Vec<RectF>,
    pub total_height: f32,
}

impl PageLayout {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, page: u32) -> Option<RectF> {
        self.frames.get(page as usize).copied()
    }
}

/// Stack pages top-to-bottom, each scaled uniformly to `target_width`.
///
/// Pages with a non-positive intrinsic width contribute a zero-height frame
/// rather than poisoning the stack below them.
pub fn compute_layout(pages: &[PageSize], target_width: f32) -> PageLayout {
    let mut frames = Vec::with_capacity(pages.len());
    let mut cursor = 0.0_f32;

    for page in pages {
        let height = if page.width > 0.0 && target_width > 0.0 {
            target_width * (page.height / page.width)
        } else {
            0.0
        };

        frames.push(RectF::new(0.0, cursor, target_width.max(0.0), height));
        cursor += height;
    }

    PageLayout { frames, total_height: cursor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_scales_uniformly() {
        let layout = compute_layout(&[PageSize::new(600.0, 800.0)], 300.0);

        assert_eq!(layout.frames.len(), 1);
        assert_eq!(layout.frames[0], RectF::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(layout.total_height, 400.0);
    }

    #[test]
    fn pages_stack_gaplessly_in_order() {
        let pages = vec![PageSize::new(600.0, 800.0), PageSize::new(300.0, 300.0)];
        let layout = compute_layout(&pages, 300.0);

        assert_eq!(layout.frames[0].min_y(), 0.0);
        assert_eq!(layout.frames[0].max_y(), 400.0);
        assert_eq!(layout.frames[1].min_y(), 400.0);
        assert_eq!(layout.frames[1].max_y(), 700.0);
        assert_eq!(layout.total_height, 700.0);
    }

    #[test]
    fn identical_inputs_yield_bit_identical_frames() {
        let pages = vec![
            PageSize::new(612.0, 792.0),
            PageSize::new(612.0, 1008.0),
            PageSize::new(420.0, 595.0),
        ];

        let first = compute_layout(&pages, 375.5);
        let second = compute_layout(&pages, 375.5);

        assert_eq!(first, second);
        for (a, b) in first.frames.iter().zip(second.frames.iter()) {
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.height.to_bits(), b.height.to_bits());
        }
    }

    #[test]
    fn zero_width_page_contributes_empty_frame() {
        let pages = vec![PageSize::new(0.0, 800.0), PageSize::new(600.0, 600.0)];
        let layout = compute_layout(&pages, 300.0);

        assert_eq!(layout.frames[0].height, 0.0);
        assert_eq!(layout.frames[1].min_y(), 0.0);
        assert_eq!(layout.total_height, 300.0);
    }

    #[test]
    fn frame_lookup_by_page_index() {
        let layout = compute_layout(&[PageSize::new(100.0, 100.0)], 50.0);
        assert!(layout.frame(0).is_some());
        assert!(layout.frame(1).is_none());
    }
}
