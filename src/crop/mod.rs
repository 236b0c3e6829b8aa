mod hit;
mod ratio;
mod resize;

pub use crate::geometry::{ImageBounds, ImagePoint};
pub use hit::{classify, Zone};
pub use ratio::{AspectLock, AspectRatio, RatioError, RatioPreset};
pub use resize::drag_edges;

/// Committed crop rectangle in image pixels.
///
/// Once owned by a [`CropBox`] it satisfies `0 <= x1 < x2 <= width` and
/// `0 <= y1 < y2 <= height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl CropRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn full(bounds: ImageBounds) -> Self {
        Self::new(0, 0, axis_limit(bounds.width), axis_limit(bounds.height))
    }

    pub const fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub const fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> ImagePoint {
        ImagePoint::new(
            (f64::from(self.x1) + f64::from(self.x2)) / 2.0,
            (f64::from(self.y1) + f64::from(self.y2)) / 2.0,
        )
    }

    pub const fn is_within(&self, bounds: ImageBounds) -> bool {
        self.x1 >= 0
            && self.y1 >= 0
            && self.x1 < self.x2
            && self.y1 < self.y2
            && self.x2 <= axis_limit(bounds.width)
            && self.y2 <= axis_limit(bounds.height)
    }

    /// Moves the rectangle by a delta, stopping at the image edges without
    /// changing its size.
    pub fn translated_within(&self, delta_x: f64, delta_y: f64, bounds: ImageBounds) -> Edges {
        let width = f64::from(self.width());
        let height = f64::from(self.height());
        let limit_x = (f64::from(bounds.width) - width).max(0.0);
        let limit_y = (f64::from(bounds.height) - height).max(0.0);
        let x1 = (f64::from(self.x1) + finite_or_zero(delta_x))
            .clamp(0.0, limit_x)
            .round();
        let y1 = (f64::from(self.y1) + finite_or_zero(delta_y))
            .clamp(0.0, limit_y)
            .round();
        Edges::new(x1, y1, x1 + width, y1 + height)
    }
}

/// Uncommitted rectangle edges. Drag math runs on these and
/// [`CropBox::commit`] turns them into a valid [`CropRect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Edges {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

impl From<CropRect> for Edges {
    fn from(rect: CropRect) -> Self {
        Self::new(
            f64::from(rect.x1),
            f64::from(rect.y1),
            f64::from(rect.x2),
            f64::from(rect.y2),
        )
    }
}

/// The authoritative crop rectangle together with the bounds it must stay in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropBox {
    bounds: ImageBounds,
    rect: CropRect,
}

impl CropBox {
    pub const fn new(bounds: ImageBounds) -> Self {
        Self {
            bounds,
            rect: CropRect::full(bounds),
        }
    }

    pub fn with_rect(bounds: ImageBounds, rect: CropRect) -> Self {
        let mut crop = Self::new(bounds);
        crop.commit(Edges::from(rect));
        crop
    }

    pub const fn bounds(&self) -> ImageBounds {
        self.bounds
    }

    pub const fn rect(&self) -> CropRect {
        self.rect
    }

    /// Rounds `edges` to whole pixels and clamps them into the image.
    ///
    /// `x1` lands in `[0, width - 1]` and `x2` in `[x1 + 1, width]`: a too-small
    /// box grows its later edge, never pushes its earlier edge below zero.
    pub fn commit(&mut self, edges: Edges) -> CropRect {
        let width = f64::from(axis_limit(self.bounds.width));
        let height = f64::from(axis_limit(self.bounds.height));
        let (x1, x2) = clamp_axis(edges.x1, edges.x2, width);
        let (y1, y2) = clamp_axis(edges.y1, edges.y2, height);
        self.rect = CropRect::new(x1, y1, x2, y2);
        self.rect
    }

    pub fn clamp_to_bounds(&mut self) -> CropRect {
        self.commit(Edges::from(self.rect))
    }

    pub fn reset_to_full(&mut self) -> CropRect {
        self.rect = CropRect::full(self.bounds);
        self.rect
    }

    /// Largest box of `ratio` that fits the image, scaled by `fill` and centred.
    pub fn reset_to_ratio(&mut self, ratio: AspectRatio, fill: f64) -> CropRect {
        let fill = if fill.is_finite() && fill > 0.0 {
            fill.min(1.0)
        } else {
            1.0
        };
        let image_width = f64::from(self.bounds.width);
        let image_height = f64::from(self.bounds.height);
        let (width, height) = ratio.fit_within(image_width, image_height);
        let (width, height) = (width * fill, height * fill);
        let x = (image_width - width) / 2.0;
        let y = (image_height - height) / 2.0;
        self.commit(Edges::new(x, y, x + width, y + height))
    }

    pub fn set_from_insets(&mut self, left: i64, right: i64, top: i64, bottom: i64) -> CropRect {
        let width = f64::from(self.bounds.width);
        let height = f64::from(self.bounds.height);
        self.commit(Edges::new(
            left as f64,
            top as f64,
            width - right as f64,
            height - bottom as f64,
        ))
    }

    pub fn translate(&mut self, delta_x: f64, delta_y: f64) -> CropRect {
        let edges = self.rect.translated_within(delta_x, delta_y, self.bounds);
        self.commit(edges)
    }

    /// Moves the box to the middle of the image, keeping its size.
    pub fn center(&mut self) -> CropRect {
        let width = f64::from(self.rect.width());
        let height = f64::from(self.rect.height());
        let x = (f64::from(self.bounds.width) - width) / 2.0;
        let y = (f64::from(self.bounds.height) - height) / 2.0;
        self.commit(Edges::new(x, y, x + width, y + height))
    }

    /// Applies a new size around the current centre.
    ///
    /// The size is capped to the image first; a box that would overhang an
    /// edge slides inward instead of being cut, so the requested size survives.
    pub fn resize_about_center(&mut self, width: f64, height: f64) -> CropRect {
        let image_width = f64::from(self.bounds.width);
        let image_height = f64::from(self.bounds.height);
        let width = finite_or_zero(width).clamp(0.0, image_width);
        let height = finite_or_zero(height).clamp(0.0, image_height);
        let center = self.rect.center();
        let x = (center.x - width / 2.0).clamp(0.0, image_width - width);
        let y = (center.y - height / 2.0).clamp(0.0, image_height - height);
        self.commit(Edges::new(x, y, x + width, y + height))
    }

    /// Replaces the bounds. A different size resets the rectangle to the full
    /// image; returns whether that happened.
    pub fn set_bounds(&mut self, bounds: ImageBounds) -> bool {
        if bounds == self.bounds {
            return false;
        }
        tracing::debug!(
            from = ?self.bounds,
            to = ?bounds,
            "image bounds changed; resetting crop to full image"
        );
        self.bounds = bounds;
        self.reset_to_full();
        true
    }
}

const fn axis_limit(extent: u32) -> i32 {
    if extent > i32::MAX as u32 {
        i32::MAX
    } else if extent == 0 {
        1
    } else {
        extent as i32
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clamp_axis(start: f64, end: f64, limit: f64) -> (i32, i32) {
    let start = finite_or_zero(start).round().clamp(0.0, limit - 1.0);
    let end = if end.is_finite() { end.round() } else { limit };
    let end = end.min(limit).max(start + 1.0);
    (start as i32, end as i32)
}
