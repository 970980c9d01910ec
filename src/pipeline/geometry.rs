//! Geometry resolution: page dimensions and image placement in points.
//!
//! Pure arithmetic, no I/O. Geometry is recomputed for every image rather
//! than cached: page size and orientation are fixed per document, but the
//! placement rectangle depends on each image's own aspect ratio.
//!
//! The uniform scale factor `min(avail_w/px_w, avail_h/px_h)` is a fit
//! operation in both directions: oversized images shrink, undersized images
//! are scaled up to fill the available area (the ratio may exceed 1).

use crate::config::{Orientation, PageSize, PdfOptions};
use crate::error::ConvertError;

/// Page metrics for one (options, image) pair, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub avail_width: f32,
    pub avail_height: f32,
}

/// The exact region an image is drawn into: centred within the available
/// content rectangle, aspect ratio preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Page dimensions in points for the given options.
///
/// Landscape swaps width and height of the base size. `Fit` pages compose
/// against the fixed A4 portrait canvas and ignore the orientation setting,
/// matching the shipped behaviour of both execution paths.
pub fn page_dimensions(options: &PdfOptions) -> (f32, f32) {
    let (base_w, base_h) = options.page_size.base_dimensions_pt();
    match (options.page_size, options.orientation) {
        (PageSize::Fit, _) => (base_w, base_h),
        (_, Orientation::Portrait) => (base_w, base_h),
        (_, Orientation::Landscape) => (base_h, base_w),
    }
}

/// Resolve the page geometry and placement rectangle for one image.
///
/// # Errors
/// [`ConvertError::Geometry`] when the image has a zero pixel dimension or
/// the margin consumes half of the smaller page dimension. A degenerate
/// available rectangle is reported, never drawn with negative size.
pub fn resolve(
    options: &PdfOptions,
    px_width: u32,
    px_height: u32,
) -> Result<(PageGeometry, PlacementRect), ConvertError> {
    if px_width == 0 || px_height == 0 {
        return Err(ConvertError::Geometry {
            detail: format!("image has degenerate pixel dimensions {px_width}x{px_height}"),
        });
    }

    let (page_width, page_height) = page_dimensions(options);
    let margin = options.margins.to_pt();

    let avail_width = page_width - margin * 2.0;
    let avail_height = page_height - margin * 2.0;
    if avail_width <= 0.0 || avail_height <= 0.0 {
        return Err(ConvertError::Geometry {
            detail: format!(
                "margin {margin}pt leaves no content area on a \
                 {page_width}x{page_height}pt page"
            ),
        });
    }

    let scale = (avail_width / px_width as f32).min(avail_height / px_height as f32);
    let width = px_width as f32 * scale;
    let height = px_height as f32 * scale;

    let placement = PlacementRect {
        x: margin + (avail_width - width) / 2.0,
        y: margin + (avail_height - height) / 2.0,
        width,
        height,
    };

    let geometry = PageGeometry {
        page_width,
        page_height,
        margin,
        avail_width,
        avail_height,
    };

    Ok((geometry, placement))
}
