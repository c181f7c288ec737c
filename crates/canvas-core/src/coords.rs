use crate::geometry::{PointF, RectF};
use crate::layout::PageLayout;
use doc_model::clamp_unit;

/// Resolution-independent anchor: a page index plus fractions of that
/// page's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub page: u32,
    pub x_fraction: f32,
    pub y_fraction: f32,
}

/// Fractional anchor for a vertical band, possibly spanning pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRange {
    pub start_page: u32,
    pub start_fraction: f32,
    pub end_page: u32,
    pub end_fraction: f32,
}

/// Converts between canvas-pixel geometry and fractional anchors over the
/// current page-frame list.
///
/// Every conversion is total: out-of-range input clamps, and when layout
/// has not produced frames yet the mapper degrades to a proportional
/// mapping across the whole canvas bounds (single-page approximation)
/// instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    frames: &'a [RectF],
    canvas_bounds: RectF,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(layout: &'a PageLayout, canvas_bounds: RectF) -> Self {
        Self { frames: &layout.frames, canvas_bounds }
    }

    /// Mapper for the window before layout has run. All conversions go
    /// through the degraded proportional branch.
    pub fn without_layout(canvas_bounds: RectF) -> Self {
        Self { frames: &[], canvas_bounds }
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn canvas_bounds(&self) -> RectF {
        self.canvas_bounds
    }

    pub fn frame(&self, page: u32) -> Option<RectF> {
        self.frames.get(page as usize).copied()
    }

    /// Map a canvas point to its fractional anchor.
    ///
    /// A point inside a frame maps directly; a point outside every frame
    /// (pointer dragged off the pages) projects onto the frame whose
    /// center is nearest.
    pub fn point_to_page_fraction(&self, point: PointF) -> PagePoint {
        if self.frames.is_empty() {
            return self.degraded_point_to_fraction(point);
        }

        if let Some((index, frame)) = self
            .frames
            .iter()
            .enumerate()
            .find(|(_, frame)| frame.contains(point))
        {
            return project_onto_frame(index as u32, *frame, point);
        }

        let (index, frame) = self
            .frames
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = point.distance_squared_to(a.center());
                let db = point.distance_squared_to(b.center());
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(index, frame)| (index as u32, *frame))
            .unwrap_or((0, RectF::default()));

        project_onto_frame(index, frame, point)
    }

    /// Map a fractional anchor back to a canvas point.
    pub fn fraction_to_point(&self, page: u32, x_fraction: f32, y_fraction: f32) -> PointF {
        let x_fraction = clamp_unit(x_fraction);
        let y_fraction = clamp_unit(y_fraction);

        if self.frames.is_empty() {
            return self.degraded_fraction_to_point(x_fraction, y_fraction);
        }

        let last = (self.frames.len() - 1) as u32;
        let frame = self.frames[page.min(last) as usize];

        PointF::new(
            frame.x + x_fraction * frame.width,
            frame.y + y_fraction * frame.height,
        )
    }

    /// Map a canvas rectangle to the page range its vertical extent covers.
    pub fn rect_to_page_range(&self, rect: RectF) -> PageRange {
        let (start_page, start_fraction) = self.page_at_y(rect.min_y());
        let (end_page, end_fraction) = self.page_at_y(rect.max_y());

        PageRange { start_page, start_fraction, end_page, end_fraction }
    }

    /// Canvas rectangle covering a page range; x extent is the union of
    /// the frames involved.
    pub fn page_range_to_rect(&self, range: &PageRange) -> RectF {
        if self.frames.is_empty() {
            let top = self.canvas_bounds.y
                + clamp_unit(range.start_fraction) * self.canvas_bounds.height;
            let bottom = self.canvas_bounds.y
                + clamp_unit(range.end_fraction) * self.canvas_bounds.height;
            return RectF::new(
                self.canvas_bounds.x,
                top.min(bottom),
                self.canvas_bounds.width,
                (bottom - top).abs(),
            );
        }

        let last = (self.frames.len() - 1) as u32;
        let start_frame = self.frames[range.start_page.min(last) as usize];
        let end_frame = self.frames[range.end_page.min(last) as usize];

        let top = start_frame.y + clamp_unit(range.start_fraction) * start_frame.height;
        let bottom = end_frame.y + clamp_unit(range.end_fraction) * end_frame.height;
        let (min_y, max_y) = if top <= bottom { (top, bottom) } else { (bottom, top) };

        let first = range.start_page.min(range.end_page).min(last) as usize;
        let span_last = range.start_page.max(range.end_page).min(last) as usize;
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for frame in &self.frames[first..=span_last] {
            min_x = min_x.min(frame.min_x());
            max_x = max_x.max(frame.max_x());
        }

        RectF::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    fn page_at_y(&self, y: f32) -> (u32, f32) {
        if self.frames.is_empty() {
            let fraction = if self.canvas_bounds.height > 0.0 {
                clamp_unit((y - self.canvas_bounds.y) / self.canvas_bounds.height)
            } else {
                0.0
            };
            return (0, fraction);
        }

        for (index, frame) in self.frames.iter().enumerate() {
            if y <= frame.max_y() && frame.height > 0.0 {
                let fraction = clamp_unit((y - frame.y) / frame.height);
                return (index as u32, fraction);
            }
        }

        ((self.frames.len() - 1) as u32, 1.0)
    }

    // Degraded-accuracy branch: the whole canvas stands in for a single
    // page until layout produces real frames. Never an error.
    fn degraded_point_to_fraction(&self, point: PointF) -> PagePoint {
        let bounds = self.canvas_bounds;
        let x_fraction = if bounds.width > 0.0 {
            clamp_unit((point.x - bounds.x) / bounds.width)
        } else {
            0.0
        };
        let y_fraction = if bounds.height > 0.0 {
            clamp_unit((point.y - bounds.y) / bounds.height)
        } else {
            0.0
        };

        PagePoint { page: 0, x_fraction, y_fraction }
    }

    fn degraded_fraction_to_point(&self, x_fraction: f32, y_fraction: f32) -> PointF {
        let bounds = self.canvas_bounds;
        PointF::new(
            bounds.x + x_fraction * bounds.width,
            bounds.y + y_fraction * bounds.height,
        )
    }
}

fn project_onto_frame(page: u32, frame: RectF, point: PointF) -> PagePoint {
    let x_fraction = if frame.width > 0.0 {
        clamp_unit((point.x - frame.x) / frame.width)
    } else {
        0.0
    };
    let y_fraction = if frame.height > 0.0 {
        clamp_unit((point.y - frame.y) / frame.height)
    } else {
        0.0
    };

    PagePoint { page, x_fraction, y_fraction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use doc_model::PageSize;

    const TOLERANCE: f32 = 1e-3;

    fn two_page_layout() -> PageLayout {
        // Two 400px-tall frames at width 300.
        compute_layout(
            &[PageSize::new(600.0, 800.0), PageSize::new(600.0, 800.0)],
            300.0,
        )
    }

    fn bounds() -> RectF {
        RectF::new(0.0, 0.0, 300.0, 800.0)
    }

    #[test]
    fn round_trip_inside_frame_is_lossless() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        for point in [
            PointF::new(12.5, 37.0),
            PointF::new(150.0, 399.0),
            PointF::new(287.0, 401.0),
            PointF::new(10.0, 763.0),
        ] {
            let anchor = mapper.point_to_page_fraction(point);
            let back = mapper.fraction_to_point(anchor.page, anchor.x_fraction, anchor.y_fraction);
            assert!((back.x - point.x).abs() < TOLERANCE, "x drifted for {point:?}");
            assert!((back.y - point.y).abs() < TOLERANCE, "y drifted for {point:?}");
        }
    }

    #[test]
    fn outside_point_projects_onto_nearest_frame() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        // Left of page 0, above the stack.
        let anchor = mapper.point_to_page_fraction(PointF::new(-50.0, -100.0));
        assert_eq!(anchor.page, 0);
        assert_eq!(anchor.x_fraction, 0.0);
        assert_eq!(anchor.y_fraction, 0.0);

        // Below the stack, right edge.
        let anchor = mapper.point_to_page_fraction(PointF::new(500.0, 2000.0));
        assert_eq!(anchor.page, 1);
        assert_eq!(anchor.x_fraction, 1.0);
        assert_eq!(anchor.y_fraction, 1.0);
    }

    #[test]
    fn rect_maps_to_expected_page_range() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let range = mapper.rect_to_page_range(RectF::new(0.0, 450.0, 300.0, 120.0));

        assert_eq!(range.start_page, 1);
        assert!((range.start_fraction - 0.125).abs() < TOLERANCE);
        assert_eq!(range.end_page, 1);
        assert!((range.end_fraction - 0.425).abs() < TOLERANCE);
    }

    #[test]
    fn rect_spanning_pages_crosses_the_boundary() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let range = mapper.rect_to_page_range(RectF::new(0.0, 350.0, 300.0, 100.0));
        assert_eq!(range.start_page, 0);
        assert_eq!(range.end_page, 1);
        assert!((range.start_fraction - 0.875).abs() < TOLERANCE);
        assert!((range.end_fraction - 0.125).abs() < TOLERANCE);
    }

    #[test]
    fn page_range_round_trips_through_rect() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let original = RectF::new(0.0, 450.0, 300.0, 120.0);
        let range = mapper.rect_to_page_range(original);
        let rect = mapper.page_range_to_rect(&range);

        assert!((rect.min_y() - original.min_y()).abs() < TOLERANCE);
        assert!((rect.max_y() - original.max_y()).abs() < TOLERANCE);
        assert_eq!(rect.min_x(), 0.0);
        assert_eq!(rect.max_x(), 300.0);
    }

    #[test]
    fn rect_beyond_stack_clamps_fractions() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let range = mapper.rect_to_page_range(RectF::new(0.0, -200.0, 300.0, 3000.0));
        assert_eq!(range.start_page, 0);
        assert_eq!(range.start_fraction, 0.0);
        assert_eq!(range.end_page, 1);
        assert_eq!(range.end_fraction, 1.0);
    }

    #[test]
    fn inverted_range_produces_normalized_rect() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let range = PageRange {
            start_page: 1,
            start_fraction: 0.5,
            end_page: 0,
            end_fraction: 0.5,
        };
        let rect = mapper.page_range_to_rect(&range);

        assert_eq!(rect.min_y(), 200.0);
        assert_eq!(rect.max_y(), 600.0);
    }

    #[test]
    fn degraded_mapping_activates_only_without_frames() {
        let canvas = RectF::new(0.0, 0.0, 400.0, 1000.0);

        let degraded = CoordinateMapper::without_layout(canvas);
        let point = degraded.fraction_to_point(3, 0.5, 0.25);
        assert_eq!(point, PointF::new(200.0, 250.0));

        let anchor = degraded.point_to_page_fraction(PointF::new(100.0, 500.0));
        assert_eq!(anchor.page, 0);
        assert!((anchor.y_fraction - 0.5).abs() < TOLERANCE);

        // With frames present the same anchor resolves through the frame,
        // not the canvas bounds.
        let layout = compute_layout(&[PageSize::new(400.0, 500.0)], 400.0);
        let mapped = CoordinateMapper::new(&layout, canvas);
        let point = mapped.fraction_to_point(0, 0.5, 0.25);
        assert_eq!(point, PointF::new(200.0, 125.0));
    }

    #[test]
    fn fraction_to_point_clamps_page_index() {
        let layout = two_page_layout();
        let mapper = CoordinateMapper::new(&layout, bounds());

        let point = mapper.fraction_to_point(99, 0.0, 0.0);
        assert_eq!(point.y, 400.0);
    }
}
