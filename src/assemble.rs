//! Document assembly: ordered images in, one serialised PDF out.
//!
//! The assembler owns the per-image loop. Images are processed strictly
//! sequentially: normalisation is CPU-bound, and holding one resampled
//! raster at a time keeps peak memory flat regardless of document size.
//! The first failing image aborts the whole operation; a partial document
//! is never returned.
//!
//! The public entry point is async and offloads the CPU-bound core to
//! `spawn_blocking`; the synchronous [`Assembler::assemble_blocking`] core
//! is also public for callers that already own a worker thread.
//!
//! Cancellation is cooperative: an [`AtomicBool`] checked between images,
//! never mid-image. When it fires, all partial document state is dropped.

use crate::config::PdfOptions;
use crate::error::ConvertError;
use crate::input::ImageInput;
use crate::pipeline::compose;
use crate::progress::Observer;
use chrono::Utc;
use lopdf::{Dictionary, Document, Object};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// MIME type of the produced byte stream.
pub const PDF_MIME: &str = "application/pdf";

/// Cooperative cancellation flag, checked between images.
pub type CancelFlag = Arc<AtomicBool>;

/// A finished conversion: the PDF byte stream plus response metadata.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The serialised PDF document.
    pub bytes: Vec<u8>,
    /// Derived filename, `converted-images-<date>.pdf` (UTC date at
    /// serialisation time).
    pub file_name: String,
    /// Byte length of `bytes`, kept alongside so response headers and the
    /// payload can never disagree.
    pub byte_len: usize,
}

impl ConversionOutput {
    /// `Content-Disposition` header value for a download response.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Derive the dated output filename.
pub fn derived_file_name() -> String {
    format!("converted-images-{}.pdf", Utc::now().format("%Y-%m-%d"))
}

/// Assembles ordered images into one PDF document.
///
/// Both execution paths run this same type: the router calls it in-process
/// for the local path, and the upload service runs it on the remote side, so
/// the two paths cannot drift apart in layout behaviour.
#[derive(Clone, Default)]
pub struct Assembler {
    observer: Option<Observer>,
    cancel: Option<CancelFlag>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive per-image progress events (used by the CLI's progress bar).
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Install a cooperative cancellation flag, checked between images.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Assemble the document on the blocking thread pool.
    ///
    /// Page order is input order; reordering the input list is the only way
    /// to change page order.
    pub async fn assemble(
        &self,
        images: Vec<ImageInput>,
        options: PdfOptions,
    ) -> Result<ConversionOutput, ConvertError> {
        let assembler = self.clone();
        tokio::task::spawn_blocking(move || assembler.assemble_blocking(&images, &options))
            .await
            .map_err(|e| ConvertError::Serialization(format!("assembly task panicked: {e}")))?
    }

    /// Synchronous assembly core.
    pub fn assemble_blocking(
        &self,
        images: &[ImageInput],
        options: &PdfOptions,
    ) -> Result<ConversionOutput, ConvertError> {
        if images.is_empty() {
            return Err(ConvertError::NoImages);
        }
        let options = options.clamped();
        let total = images.len();
        let start = Instant::now();

        if let Some(observer) = &self.observer {
            observer.on_start(total);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = compose::add_helvetica(&mut doc);

        let mut page_ids = Vec::with_capacity(total);
        for (index, image) in images.iter().enumerate() {
            if self.is_cancelled() {
                debug!(done = index, total, "Assembly cancelled between images");
                return Err(ConvertError::Cancelled);
            }

            let page_id =
                compose::compose_page(&mut doc, pages_id, font_id, image, &options, index, total)?;
            page_ids.push(page_id);

            if let Some(observer) = &self.observer {
                observer.on_image_done(index, total);
            }
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(total as i64)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ConvertError::Serialization(e.to_string()))?;

        let file_name = derived_file_name();
        let byte_len = bytes.len();

        if let Some(observer) = &self.observer {
            observer.on_complete(total, byte_len);
        }

        info!(
            pages = total,
            byte_len,
            elapsed_ms = start.elapsed().as_millis() as u64,
            %file_name,
            "Assembled document"
        );

        Ok(ConversionOutput {
            bytes,
            file_name,
            byte_len,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Assemble with default settings (no observer, no cancellation).
pub async fn assemble(
    images: Vec<ImageInput>,
    options: PdfOptions,
) -> Result<ConversionOutput, ConvertError> {
    Assembler::new().assemble(images, options).await
}
