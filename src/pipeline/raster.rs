//! Raster normalisation: resample to on-page resolution, re-encode as JPEG.
//!
//! The stored resolution of an embedded image is decoupled from its display
//! size: the placement rectangle (points) is converted to inches and
//! multiplied by the configured DPI ceiling to get the pixel count the page
//! actually needs. An 8000-pixel photo placed into a 566-pt rectangle at
//! 200 DPI is stored as 1574 pixels wide, which is the primary file-size
//! control of the whole engine.
//!
//! Resampling uses Lanczos3 and the result is always re-encoded as baseline
//! JPEG at the configured quality, regardless of the source encoding.

use crate::error::ConvertError;
use crate::input::ImageInput;
use crate::pipeline::geometry::PlacementRect;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use tracing::debug;

/// A raster ready for embedding: JPEG bytes plus their pixel dimensions.
#[derive(Debug, Clone)]
pub struct NormalizedRaster {
    pub jpeg: Vec<u8>,
    pub px_width: u32,
    pub px_height: u32,
}

/// Decode an image payload.
///
/// Each payload is decoded exactly once per conversion; the decoded raster
/// is handed on to [`normalize`] and the geometry resolver.
///
/// # Errors
/// [`ConvertError::ImageDecode`] naming the offending file. This aborts the
/// whole document: no partial PDF is ever produced around a bad image.
pub fn decode(input: &ImageInput) -> Result<DynamicImage, ConvertError> {
    image::load_from_memory(&input.bytes).map_err(|e| ConvertError::ImageDecode {
        name: input.name.clone(),
        detail: e.to_string(),
    })
}

/// Resample `source` to the resolution its placement needs and re-encode it.
///
/// `quality` is clamped to the encoder range before use. Target pixel
/// dimensions are floored at 1x1; a placement rectangle with zero or
/// negative extent is a configuration error surfaced upward, never coerced.
pub fn normalize(
    name: &str,
    source: &DynamicImage,
    placement: &PlacementRect,
    quality: u8,
    max_dpi: u32,
) -> Result<NormalizedRaster, ConvertError> {
    if placement.width <= 0.0 || placement.height <= 0.0 {
        return Err(ConvertError::Geometry {
            detail: format!(
                "placement rectangle for '{name}' is degenerate \
                 ({}x{}pt)",
                placement.width, placement.height
            ),
        });
    }

    // Placement points -> inches -> pixels at the configured DPI ceiling.
    let target_width = ((placement.width / 72.0) * max_dpi as f32).round().max(1.0) as u32;
    let target_height = ((placement.height / 72.0) * max_dpi as f32).round().max(1.0) as u32;

    let (src_width, src_height) = source.dimensions();
    let resampled;
    let raster = if (src_width, src_height) == (target_width, target_height) {
        source
    } else {
        resampled = source.resize_exact(target_width, target_height, FilterType::Lanczos3);
        &resampled
    };

    // JPEG has no alpha channel; transparent source pixels land on black.
    let rgb = raster.to_rgb8();

    let quality = quality.clamp(1, 100);
    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ConvertError::Serialization(format!("JPEG encode for '{name}': {e}")))?;

    debug!(
        name,
        src_width,
        src_height,
        target_width,
        target_height,
        quality,
        jpeg_len = jpeg.len(),
        "Normalised raster"
    );

    Ok(NormalizedRaster {
        jpeg,
        px_width: target_width,
        px_height: target_height,
    })
}
