use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crop::{CropRect, ImageBounds};
use crate::sync::CropParameters;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot crop an empty image")]
    EmptyImage,
    #[error(
        "crop region {width}x{height}+{x}+{y} exceeds image {image_width}x{image_height}"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
    #[error("failed to serialize crop report")]
    Serialize(#[from] serde_json::Error),
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Pixel region handed to the crop step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Resolves inset parameters against `bounds`. Out-of-range insets are
    /// clamped and every region is at least one pixel on each axis.
    pub fn resolve(params: &CropParameters, bounds: ImageBounds) -> Self {
        let (x, width) = resolve_axis(params.left, params.right, bounds.width);
        let (y, height) = resolve_axis(params.top, params.bottom, bounds.height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(rect: CropRect) -> Self {
        Self {
            x: rect.x1.max(0).unsigned_abs(),
            y: rect.y1.max(0).unsigned_abs(),
            width: rect.width().max(0).unsigned_abs(),
            height: rect.height().max(0).unsigned_abs(),
        }
    }

    pub fn report(&self, bounds: ImageBounds) -> CropReport {
        CropReport {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            orig_width: bounds.width,
            orig_height: bounds.height,
        }
    }

    fn check_within(&self, image_width: u32, image_height: u32) -> OutputResult<()> {
        let fits_x = u64::from(self.x) + u64::from(self.width) <= u64::from(image_width);
        let fits_y = u64::from(self.y) + u64::from(self.height) <= u64::from(image_height);
        if fits_x && fits_y && self.width > 0 && self.height > 0 {
            return Ok(());
        }
        Err(OutputError::RegionOutOfBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            image_width,
            image_height,
        })
    }
}

fn resolve_axis(start_inset: i64, end_inset: i64, extent: u32) -> (u32, u32) {
    let extent = i64::from(extent.max(1));
    let start = start_inset.min(extent - 1).max(0);
    let end = extent.saturating_sub(end_inset).min(extent).max(start + 1);
    // Both values are within [0, u32::MAX] after clamping.
    (start as u32, (end - start) as u32)
}

/// JSON report describing the applied crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropReport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl CropReport {
    pub fn to_json(&self) -> OutputResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn crop_image(image: &DynamicImage, region: CropRegion) -> OutputResult<DynamicImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OutputError::EmptyImage);
    }
    region.check_within(width, height)?;
    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}

/// Crops `mask` to `region`, or produces a fully opaque mask of the region's
/// size when no mask is given.
pub fn crop_mask(mask: Option<&GrayImage>, region: CropRegion) -> OutputResult<GrayImage> {
    let Some(mask) = mask else {
        return Ok(GrayImage::from_pixel(
            region.width,
            region.height,
            Luma([u8::MAX]),
        ));
    };
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Err(OutputError::EmptyImage);
    }
    region.check_within(width, height)?;
    Ok(image::imageops::crop_imm(mask, region.x, region.y, region.width, region.height).to_image())
}

/// Size readout drawn over the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSummary {
    pub width: u32,
    pub height: u32,
    pub width_percent: u32,
    pub height_percent: u32,
}

impl CropSummary {
    pub fn new(rect: CropRect, bounds: ImageBounds) -> Self {
        let region = CropRegion::from_rect(rect);
        Self {
            width: region.width,
            height: region.height,
            width_percent: percent_of(region.width, bounds.width),
            height_percent: percent_of(region.height, bounds.height),
        }
    }

    pub fn pixel_label(&self) -> String {
        format!("{} × {} px", self.width, self.height)
    }

    pub fn percent_label(&self) -> String {
        format!("{} × {} %", self.width_percent, self.height_percent)
    }
}

fn percent_of(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn params(left: i64, right: i64, top: i64, bottom: i64) -> CropParameters {
        CropParameters {
            left,
            right,
            top,
            bottom,
            ..CropParameters::default()
        }
    }

    #[test]
    fn resolve_applies_insets_inside_bounds() {
        let region = CropRegion::resolve(&params(10, 20, 5, 15), ImageBounds::new(200, 100));
        assert_eq!(
            region,
            CropRegion {
                x: 10,
                y: 5,
                width: 170,
                height: 80
            }
        );
    }

    #[test]
    fn resolve_clamps_out_of_range_insets() {
        let bounds = ImageBounds::new(1000, 600);
        let region = CropRegion::resolve(&params(-20, 100, 0, -5), bounds);
        assert_eq!(region.x, 0);
        assert_eq!(region.width, 900);
        assert_eq!(region.height, 600);

        let region = CropRegion::resolve(&params(5000, 5000, 700, 0), bounds);
        assert_eq!(
            region,
            CropRegion {
                x: 999,
                y: 599,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn report_serializes_with_original_dimensions() {
        let bounds = ImageBounds::new(640, 480);
        let report = CropRegion::resolve(&params(40, 0, 30, 50), bounds).report(bounds);
        let json = report.to_json().expect("report should serialize");
        assert_eq!(
            json,
            r#"{"x":40,"y":30,"width":600,"height":400,"orig_width":640,"orig_height":480}"#
        );
        let parsed: CropReport = serde_json::from_str(&json).expect("report should parse");
        assert_eq!(parsed, report);
    }

    #[test]
    fn crop_image_cuts_the_region() {
        let mut source = RgbaImage::from_pixel(8, 6, Rgba([0, 0, 0, 255]));
        source.put_pixel(3, 2, Rgba([255, 0, 0, 255]));
        let image = DynamicImage::ImageRgba8(source);
        let region = CropRegion {
            x: 3,
            y: 2,
            width: 4,
            height: 3,
        };

        let cropped = crop_image(&image, region).expect("region fits the image");
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(cropped.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn crop_image_rejects_regions_outside_the_image() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(8, 6));
        let region = CropRegion {
            x: 6,
            y: 0,
            width: 4,
            height: 2,
        };
        let err = crop_image(&image, region).expect_err("region overflows width");
        assert!(matches!(err, OutputError::RegionOutOfBounds { x: 6, .. }));

        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            crop_image(&empty, region),
            Err(OutputError::EmptyImage)
        ));
    }

    #[test]
    fn missing_mask_becomes_opaque_region_sized_mask() {
        let region = CropRegion {
            x: 2,
            y: 2,
            width: 5,
            height: 3,
        };
        let mask = crop_mask(None, region).expect("generated mask");
        assert_eq!(mask.dimensions(), (5, 3));
        assert!(mask.pixels().all(|pixel| pixel.0 == [255]));

        let mut source = GrayImage::new(10, 10);
        source.put_pixel(2, 2, Luma([7]));
        let mask = crop_mask(Some(&source), region).expect("mask covers region");
        assert_eq!(mask.get_pixel(0, 0).0, [7]);
        assert_eq!(mask.get_pixel(1, 0).0, [0]);
    }

    #[test]
    fn summary_labels_round_percentages() {
        let summary = CropSummary::new(CropRect::new(0, 0, 333, 500), ImageBounds::new(1000, 600));
        assert_eq!(summary.pixel_label(), "333 × 500 px");
        assert_eq!(summary.percent_label(), "33 × 83 %");
    }
}
