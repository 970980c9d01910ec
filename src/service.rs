//! Upload service: the remote-side half of the execution router.
//!
//! An HTTP layer hands the parsed upload (images + options) to
//! [`process_upload`]; everything below the request parsing lives here so
//! the remote path shares the exact assembler the local path runs.
//!
//! Uploaded bytes are spooled into a per-request directory under the
//! configured spool root for the duration of processing. The directory is a
//! [`tempfile::TempDir`], so removal is guaranteed on every exit: the
//! success path closes it explicitly, and any failure path removes it on
//! drop. A failure while composing image N cannot leak the spooled files of
//! images 1..N-1.

use crate::assemble::{Assembler, ConversionOutput};
use crate::config::{Limits, PdfOptions};
use crate::error::ConvertError;
use crate::input::{self, ImageInput};
use std::path::Path;
use tracing::{debug, warn};

/// Convert an uploaded request on the remote side.
///
/// Ceiling checks (per-image, count, and the remote total) run before any
/// byte is spooled or decoded; a request that violates them fails without
/// touching the file system.
pub async fn process_upload(
    images: Vec<ImageInput>,
    options: PdfOptions,
    limits: &Limits,
    spool_root: &Path,
) -> Result<ConversionOutput, ConvertError> {
    let options = options.clamped();
    input::validate(&images, limits)?;

    let total = input::total_size(&images);
    if total > limits.max_remote_bytes {
        return Err(ConvertError::PayloadTooLarge {
            total,
            limit: limits.max_remote_bytes,
        });
    }

    tokio::fs::create_dir_all(spool_root)
        .await
        .map_err(|source| ConvertError::Spool { source })?;
    let spool = tempfile::Builder::new()
        .prefix("req-")
        .tempdir_in(spool_root)
        .map_err(|source| ConvertError::Spool { source })?;

    for image in &images {
        let path = spool.path().join(&image.id);
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|source| ConvertError::Spool { source })?;
    }
    debug!(
        spool = %spool.path().display(),
        images = images.len(),
        total,
        "Spooled upload"
    );

    let result = Assembler::new().assemble(images, options).await;

    // Runs on success and failure alike; close() surfaces removal errors
    // that a plain drop would swallow.
    if let Err(e) = spool.close() {
        warn!("Failed to remove request spool directory: {e}");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn jpeg_input(name: &str, width: u32, height: u32) -> ImageInput {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        ImageInput::new(name, "image/jpeg", bytes)
    }

    fn spool_entries(root: &Path) -> usize {
        std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn success_leaves_no_spool_behind() {
        let root = tempfile::tempdir().unwrap();
        let images = vec![jpeg_input("a.jpg", 64, 64), jpeg_input("b.jpg", 32, 48)];

        let output = process_upload(
            images,
            PdfOptions::default(),
            &Limits::default(),
            root.path(),
        )
        .await
        .unwrap();

        assert!(output.byte_len > 0);
        assert_eq!(spool_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn failure_leaves_no_spool_behind() {
        let root = tempfile::tempdir().unwrap();
        let images = vec![
            jpeg_input("good.jpg", 64, 64),
            ImageInput::new("corrupt.jpg", "image/jpeg", vec![0, 1, 2, 3]),
        ];

        let err = process_upload(
            images,
            PdfOptions::default(),
            &Limits::default(),
            root.path(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ConvertError::ImageDecode { ref name, .. } if name == "corrupt.jpg"));
        assert_eq!(spool_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn remote_ceiling_rejects_before_spooling() {
        let root = tempfile::tempdir().unwrap();
        let limits = Limits {
            max_image_bytes: 1000,
            max_remote_bytes: 10,
            ..Limits::default()
        };
        let images = vec![ImageInput::new("a.jpg", "image/jpeg", vec![0u8; 100])];

        let err = process_upload(images, PdfOptions::default(), &limits, root.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConvertError::PayloadTooLarge {
                total: 100,
                limit: 10
            }
        ));
        assert_eq!(spool_entries(root.path()), 0);
    }
}
