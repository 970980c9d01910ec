//! Image ingestion: the [`ImageInput`] payload type and request validation.
//!
//! Validation runs before any pixel is decoded. Ceiling checks (per-image
//! size, image count) and the MIME allowlist all fail fast here so a request
//! that can never succeed is rejected without burning CPU on decoding, and
//! so failures name the offending file.

use crate::config::Limits;
use crate::error::ConvertError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Declared MIME types accepted for conversion.
pub const SUPPORTED_MIME: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One user-supplied image: opaque payload plus the metadata the pipeline
/// needs to place, recompress, and report on it.
///
/// Immutable after ingestion. The assembler borrows the payload; it is never
/// copied between pipeline stages.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Stable identifier assigned at ingestion.
    pub id: String,
    /// Display name, used in error messages (`ImageDecode` names this).
    pub name: String,
    /// Declared MIME type. Checked against [`SUPPORTED_MIME`].
    pub mime: String,
    /// Raw encoded payload as uploaded.
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// Ingest one image payload, assigning it a fresh identifier.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let id = format!("img-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Total payload size of a request, the quantity the router routes on.
pub fn total_size(images: &[ImageInput]) -> u64 {
    images.iter().map(ImageInput::len).sum()
}

/// Guess the declared MIME type from a file name's extension.
///
/// Used by callers ingesting from the file system (the CLI); uploads arrive
/// with a declared type already.
pub fn guess_mime(name: &str) -> Option<&'static str> {
    let ext = name.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Validate a request against the allowlist and per-image/count ceilings.
///
/// Runs before any processing. The total-size ceilings are the router's
/// concern; this checks everything that is per-file or per-request-shape.
pub fn validate(images: &[ImageInput], limits: &Limits) -> Result<(), ConvertError> {
    if images.is_empty() {
        return Err(ConvertError::NoImages);
    }

    if images.len() > limits.max_images {
        return Err(ConvertError::TooManyImages {
            count: images.len(),
            limit: limits.max_images,
        });
    }

    for image in images {
        let mime = image.mime.to_ascii_lowercase();
        if !SUPPORTED_MIME.contains(&mime.as_str()) {
            return Err(ConvertError::UnsupportedType {
                name: image.name.clone(),
                mime: image.mime.clone(),
            });
        }

        if image.len() > limits.max_image_bytes {
            return Err(ConvertError::ImageTooLarge {
                name: image.name.clone(),
                size: image.len(),
                limit: limits.max_image_bytes,
            });
        }
    }

    Ok(())
}
