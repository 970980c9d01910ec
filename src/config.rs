//! Configuration types for image-to-PDF conversion.
//!
//! All layout behaviour is controlled through [`PdfOptions`], built via its
//! [`PdfOptionsBuilder`] or deserialised from the JSON shape the two
//! execution paths exchange (`{pageSize, orientation, margins, quality?,
//! maxDPI?}`). Size ceilings live in [`Limits`] and the housekeeping sweep is
//! configured by [`SweepConfig`]; both are explicit structs handed to the
//! router and sweep at construction rather than read from the environment at
//! call sites.
//!
//! Numeric fields clamp instead of failing: the builder setters clamp on the
//! way in, and [`PdfOptions::clamped`] re-normalises values that arrived via
//! deserialisation. Nothing downstream of the configuration boundary ever
//! sees an out-of-range quality or DPI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A4 page size in PDF points (1 pt = 1/72 inch).
pub const A4_PT: (f32, f32) = (595.0, 842.0);
/// US Letter page size in PDF points.
pub const LETTER_PT: (f32, f32) = (612.0, 792.0);

/// JPEG quality range accepted by [`PdfOptions`].
pub const QUALITY_RANGE: std::ops::RangeInclusive<u8> = 1..=100;
/// Raster DPI range accepted by [`PdfOptions`].
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 72..=600;

const DEFAULT_QUALITY: u8 = 85;
const DEFAULT_MAX_DPI: u32 = 200;

const MIB: u64 = 1024 * 1024;

/// Nominal page size for every page of the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 595 × 842 pt. (default)
    #[default]
    A4,
    /// 612 × 792 pt.
    Letter,
    /// Composes against the fixed A4 portrait canvas; images are still
    /// scaled to fit within the margins rather than sizing the page to the
    /// image.
    Fit,
}

impl PageSize {
    /// Base (portrait) dimensions in points. `Fit` reports the A4 canvas.
    pub fn base_dimensions_pt(self) -> (f32, f32) {
        match self {
            PageSize::A4 | PageSize::Fit => A4_PT,
            PageSize::Letter => LETTER_PT,
        }
    }
}

/// Page orientation. `Fit` pages ignore this and stay portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page margin preset in millimetres.
///
/// The point values are a fixed lookup, not a live mm-to-pt conversion, so
/// both execution paths agree on the exact placement arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Margin {
    Mm0,
    #[default]
    Mm5,
    Mm10,
    Mm20,
}

impl Margin {
    /// Margin in points: {0 → 0, 5 → 14.17, 10 → 28.35, 20 → 56.69}.
    pub fn to_pt(self) -> f32 {
        match self {
            Margin::Mm0 => 0.0,
            Margin::Mm5 => 14.17,
            Margin::Mm10 => 28.35,
            Margin::Mm20 => 56.69,
        }
    }

    /// Millimetre value as exchanged on the wire.
    pub fn millimetres(self) -> u8 {
        match self {
            Margin::Mm0 => 0,
            Margin::Mm5 => 5,
            Margin::Mm10 => 10,
            Margin::Mm20 => 20,
        }
    }
}

impl TryFrom<u8> for Margin {
    type Error = String;

    fn try_from(mm: u8) -> Result<Self, Self::Error> {
        match mm {
            0 => Ok(Margin::Mm0),
            5 => Ok(Margin::Mm5),
            10 => Ok(Margin::Mm10),
            20 => Ok(Margin::Mm20),
            other => Err(format!("margin must be one of 0, 5, 10, 20 mm; got {other}")),
        }
    }
}

impl From<Margin> for u8 {
    fn from(m: Margin) -> u8 {
        m.millimetres()
    }
}

/// Layout and raster options for one conversion.
///
/// # Example
/// ```rust
/// use img2pdf::{Margin, Orientation, PageSize, PdfOptions};
///
/// let options = PdfOptions::builder()
///     .page_size(PageSize::A4)
///     .orientation(Orientation::Landscape)
///     .margin(Margin::Mm10)
///     .quality(80)
///     .max_dpi(150)
///     .build();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    /// Nominal page size for every page. Default: A4.
    pub page_size: PageSize,

    /// Page orientation. Default: Portrait.
    pub orientation: Orientation,

    /// Margin preset applied on all four sides. Default: 5 mm.
    pub margins: Margin,

    /// JPEG re-encode quality. Range: 1–100. Default: 85.
    ///
    /// This is the primary file-size knob after DPI: every image is
    /// recompressed at this quality regardless of its source encoding.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Ceiling on the stored raster resolution, in dots per inch of the
    /// final on-page placement. Range: 72–600. Default: 200.
    ///
    /// The normaliser resamples each image to the pixel count its placement
    /// rectangle actually needs at this DPI, so an 8000-pixel-wide photo on
    /// an A4 page is stored at on-page resolution instead of full size.
    #[serde(default = "default_max_dpi", rename = "maxDPI")]
    pub max_dpi: u32,
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_max_dpi() -> u32 {
    DEFAULT_MAX_DPI
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margin::Mm5,
            quality: DEFAULT_QUALITY,
            max_dpi: DEFAULT_MAX_DPI,
        }
    }
}

impl PdfOptions {
    /// Create a new builder for `PdfOptions`.
    pub fn builder() -> PdfOptionsBuilder {
        PdfOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Clamp numeric fields into their documented ranges.
    ///
    /// The builder already clamps on the way in; this covers options that
    /// arrived via deserialisation or literal construction. Called at every
    /// API boundary (router, upload service, CLI) so the geometry and raster
    /// stages only ever see normalised values.
    pub fn clamped(mut self) -> Self {
        self.quality = self
            .quality
            .clamp(*QUALITY_RANGE.start(), *QUALITY_RANGE.end());
        self.max_dpi = self.max_dpi.clamp(*DPI_RANGE.start(), *DPI_RANGE.end());
        self
    }
}

/// Builder for [`PdfOptions`]. Setters clamp numeric fields immediately.
#[derive(Debug)]
pub struct PdfOptionsBuilder {
    options: PdfOptions,
}

impl PdfOptionsBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.options.page_size = size;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = orientation;
        self
    }

    pub fn margin(mut self, margin: Margin) -> Self {
        self.options.margins = margin;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = quality.clamp(*QUALITY_RANGE.start(), *QUALITY_RANGE.end());
        self
    }

    pub fn max_dpi(mut self, dpi: u32) -> Self {
        self.options.max_dpi = dpi.clamp(*DPI_RANGE.start(), *DPI_RANGE.end());
        self
    }

    /// Build the options. Cannot fail: every field is an enum or already
    /// clamped.
    pub fn build(self) -> PdfOptions {
        self.options
    }
}

/// Size ceilings for one conversion request.
///
/// Passed into the [`crate::router::Router`] and
/// [`crate::service::process_upload`] at construction. All byte values; the
/// defaults match the product limits (10 MB per image, 25 MB local total,
/// 100 MB remote total, 20 images per document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest single image payload accepted.
    pub max_image_bytes: u64,
    /// Largest total payload assembled in the local environment.
    pub max_local_bytes: u64,
    /// Largest total payload the remote path accepts.
    pub max_remote_bytes: u64,
    /// Most images one document may contain.
    pub max_images: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * MIB,
            max_local_bytes: 25 * MIB,
            max_remote_bytes: 100 * MIB,
            max_images: 20,
        }
    }
}

/// Configuration for the transient-storage sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Spool directory the sweep scans. A missing directory is a no-op.
    pub root: PathBuf,
    /// Entries whose mtime is older than this are removed. Default: 2 hours.
    pub retention: Duration,
}

impl SweepConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retention: Duration::from_secs(2 * 60 * 60),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}
