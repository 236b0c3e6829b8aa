//! Shared geometric primitives: image bounds, points in both coordinate spaces and
//! the viewport transform that relates them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width.max(1)) / f64::from(self.height.max(1))
    }
}

/// A position in image-pixel space. Fractional while a pointer is tracked,
/// rounded only when a rectangle is committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in the coordinate system of the rendered preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> ViewportPoint {
        ViewportPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Snapshot of how the preview maps image space to display space:
/// `display = origin + image * scale`.
///
/// The renderer recomputes this on every layout pass; the engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
    /// Display-space size of the mapped image, when known.
    pub extent: Option<(f64, f64)>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub const fn new(origin_x: f64, origin_y: f64, scale: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            scale,
            extent: None,
        }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn with_extent(mut self, width: f64, height: f64) -> Self {
        self.extent = Some((width, height));
        self
    }

    /// Letterboxes `image` into `area`: uniform scale, centred along the axis
    /// with spare room.
    pub fn fit(image: ImageBounds, area: ViewportRect) -> Self {
        let image_width = f64::from(image.width.max(1));
        let area_width = area.width.max(1.0);
        let area_height = area.height.max(1.0);
        let image_aspect = image.aspect();

        let (width, height, x, y) = if image_aspect > area_width / area_height {
            let height = area_width / image_aspect;
            (
                area_width,
                height,
                area.x,
                area.y + (area_height - height) / 2.0,
            )
        } else {
            let width = area_height * image_aspect;
            (
                width,
                area_height,
                area.x + (area_width - width) / 2.0,
                area.y,
            )
        };

        Self::new(x, y, width / image_width).with_extent(width, height)
    }

    /// Scale used for arithmetic. Degenerate scales behave like 1:1.
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    pub fn contains(&self, point: ViewportPoint) -> bool {
        match self.extent {
            Some((width, height)) => {
                point.x >= self.origin_x
                    && point.x <= self.origin_x + width
                    && point.y >= self.origin_y
                    && point.y <= self.origin_y + height
            }
            None => true,
        }
    }
}

/// Maps a display position into image space, or `None` when the transform
/// carries an extent and the point falls outside of it.
pub fn to_image_space(point: ViewportPoint, transform: &ViewTransform) -> Option<ImagePoint> {
    if !transform.contains(point) {
        return None;
    }
    Some(to_image_space_unbounded(point, transform))
}

/// Like [`to_image_space`] but never rejects a point. Used while a drag is
/// active so the pointer can travel past the preview edge.
pub fn to_image_space_unbounded(point: ViewportPoint, transform: &ViewTransform) -> ImagePoint {
    let scale = transform.effective_scale();
    ImagePoint::new(
        (point.x - transform.origin_x) / scale,
        (point.y - transform.origin_y) / scale,
    )
}

pub fn to_viewport_space(point: ImagePoint, transform: &ViewTransform) -> ViewportPoint {
    let scale = transform.effective_scale();
    ViewportPoint::new(
        transform.origin_x + point.x * scale,
        transform.origin_y + point.y * scale,
    )
}

/// Display-space rectangle covering the image-space box `(x1, y1)..(x2, y2)`.
pub fn rect_to_viewport(
    top_left: ImagePoint,
    bottom_right: ImagePoint,
    transform: &ViewTransform,
) -> ViewportRect {
    let start = to_viewport_space(top_left, transform);
    let end = to_viewport_space(bottom_right, transform);
    ViewportRect::new(start.x, start.y, end.x - start.x, end.y - start.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rect_to_viewport_scales_and_offsets_both_corners() {
        let transform = ViewTransform::new(20.0, 10.0, 0.5);
        let rect = rect_to_viewport(
            ImagePoint::new(100.0, 100.0),
            ImagePoint::new(300.0, 200.0),
            &transform,
        );
        assert_eq!(rect, ViewportRect::new(70.0, 60.0, 100.0, 50.0));
        assert_eq!(rect.center(), ViewportPoint::new(120.0, 85.0));
    }

    #[test]
    fn image_and_viewport_space_round_trip() {
        let transform = ViewTransform::new(12.0, 40.0, 0.5);
        let image = ImagePoint::new(300.0, 120.0);
        let viewport = to_viewport_space(image, &transform);
        assert_eq!(viewport, ViewportPoint::new(162.0, 100.0));

        let back = to_image_space(viewport, &transform).expect("no extent means always mapped");
        assert_abs_diff_eq!(back.x, 300.0);
        assert_abs_diff_eq!(back.y, 120.0);
    }

    #[test]
    fn to_image_space_rejects_points_outside_extent() {
        let transform = ViewTransform::new(10.0, 10.0, 2.0).with_extent(200.0, 100.0);
        assert!(to_image_space(ViewportPoint::new(5.0, 50.0), &transform).is_none());
        assert!(to_image_space(ViewportPoint::new(50.0, 111.0), &transform).is_none());
        assert_eq!(
            to_image_space(ViewportPoint::new(210.0, 110.0), &transform),
            Some(ImagePoint::new(100.0, 50.0))
        );
        assert_eq!(
            to_image_space_unbounded(ViewportPoint::new(0.0, 0.0), &transform),
            ImagePoint::new(-5.0, -5.0)
        );
    }

    #[test]
    fn degenerate_scale_is_treated_as_identity() {
        let transform = ViewTransform::new(0.0, 0.0, 0.0);
        assert_eq!(
            to_image_space_unbounded(ViewportPoint::new(7.0, 9.0), &transform),
            ImagePoint::new(7.0, 9.0)
        );
        let transform = ViewTransform::new(0.0, 0.0, f64::NAN);
        assert_abs_diff_eq!(transform.effective_scale(), 1.0);
    }

    #[test]
    fn fit_letterboxes_wide_image_vertically() {
        let transform = ViewTransform::fit(
            ImageBounds::new(1000, 500),
            ViewportRect::new(10.0, 20.0, 400.0, 400.0),
        );
        assert_abs_diff_eq!(transform.scale, 0.4);
        assert_abs_diff_eq!(transform.origin_x, 10.0);
        assert_abs_diff_eq!(transform.origin_y, 120.0);
        assert_eq!(transform.extent, Some((400.0, 200.0)));
    }

    #[test]
    fn fit_pillarboxes_tall_image_horizontally() {
        let transform = ViewTransform::fit(
            ImageBounds::new(300, 600),
            ViewportRect::new(0.0, 0.0, 400.0, 300.0),
        );
        assert_abs_diff_eq!(transform.scale, 0.5);
        assert_abs_diff_eq!(transform.origin_x, 125.0);
        assert_abs_diff_eq!(transform.origin_y, 0.0);
    }
}
