//! Error types for the img2pdf library.
//!
//! Every variant is fatal to the conversion that raised it: the engine never
//! returns a partial document. Either all images compose into one valid PDF,
//! or the whole operation fails with one of these errors and any transient
//! resources are already cleaned up.
//!
//! [`ConvertError::is_validation`] splits the taxonomy into caller mistakes
//! (bad options, oversized payloads, unsupported files) and processing
//! failures, which is the distinction an HTTP layer needs to pick a 4xx or
//! 5xx status.

use thiserror::Error;

/// All errors returned by the img2pdf library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// Options could not be interpreted at the configuration boundary.
    ///
    /// Out-of-range numeric fields are clamped, never rejected; this variant
    /// covers malformed enum values and unparseable option payloads.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The request contained no images at all.
    #[error("No images provided")]
    NoImages,

    /// A file's declared type is not in the JPG/PNG allowlist.
    #[error("'{name}': only JPG and PNG files are supported (got '{mime}')")]
    UnsupportedType { name: String, mime: String },

    /// A single image exceeds the per-file ceiling.
    #[error("'{name}' is {size} bytes, which exceeds the {limit}-byte per-image limit")]
    ImageTooLarge {
        name: String,
        size: u64,
        limit: u64,
    },

    /// The request carries more images than one document may hold.
    #[error("{count} images exceeds the {limit}-image document limit")]
    TooManyImages { count: usize, limit: usize },

    /// Total payload exceeds every configured processing ceiling.
    #[error("Total upload size {total} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { total: u64, limit: u64 },

    /// Payload is too large for local processing and no remote endpoint is
    /// configured to take it.
    #[error(
        "Total upload size {total} bytes exceeds the {limit}-byte local limit \
         and no remote endpoint is configured"
    )]
    RemoteDisabled { total: u64, limit: u64 },

    // ── Processing errors ─────────────────────────────────────────────────
    /// An image payload could not be decoded. Names the offending file so
    /// the caller can tell the user which upload to fix.
    #[error("Failed to process image '{name}': {detail}")]
    ImageDecode { name: String, detail: String },

    /// The resolved page geometry is degenerate (e.g. the margin consumes
    /// the whole page, or a placement rectangle collapsed to zero).
    #[error("Degenerate page geometry: {detail}")]
    Geometry { detail: String },

    /// The finished document failed to serialise to bytes.
    #[error("Failed to serialise PDF document: {0}")]
    Serialization(String),

    /// The caller cancelled the conversion between images. All partial
    /// document state has been discarded.
    #[error("Conversion cancelled")]
    Cancelled,

    // ── Remote / storage errors ───────────────────────────────────────────
    /// Per-request spool storage could not be created or written.
    #[error("Spool storage error: {source}")]
    Spool {
        #[source]
        source: std::io::Error,
    },

    /// The remote endpoint could not be reached or the transfer failed.
    #[error("Remote conversion transport failure: {0}")]
    RemoteTransport(#[from] reqwest::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("Remote conversion rejected (HTTP {status}): {message}")]
    RemoteRejected { status: u16, message: String },
}

impl ConvertError {
    /// True when the error is the caller's fault: bad options, unsupported
    /// or oversized input. An HTTP layer maps these to 4xx; everything else
    /// is a 5xx processing failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConvertError::InvalidOptions(_)
                | ConvertError::NoImages
                | ConvertError::UnsupportedType { .. }
                | ConvertError::ImageTooLarge { .. }
                | ConvertError::TooManyImages { .. }
                | ConvertError::PayloadTooLarge { .. }
                | ConvertError::RemoteDisabled { .. }
        )
    }
}
