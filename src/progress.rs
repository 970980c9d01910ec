//! Progress-observer trait for per-image assembly events.
//!
//! Inject an [`Arc<dyn AssemblyObserver>`] via
//! [`crate::assemble::Assembler::with_observer`] to receive events as the
//! assembler works through the image list. Callers can forward events to a
//! terminal progress bar, a channel, or a job record without the library
//! knowing how the host application communicates.
//!
//! Events fire from the blocking assembly loop, strictly in image order.
//! Implementations must still be `Send + Sync` because the loop runs on a
//! `spawn_blocking` thread, not the caller's.

use std::sync::Arc;

/// Called by the assembler as it composes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AssemblyObserver: Send + Sync {
    /// Called once before the first image is processed.
    fn on_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called after the page for image `index` (0-based) has been composed.
    fn on_image_done(&self, index: usize, total_images: usize) {
        let _ = (index, total_images);
    }

    /// Called once after the document has been serialised.
    ///
    /// Not called when assembly fails or is cancelled.
    fn on_complete(&self, total_images: usize, pdf_bytes: usize) {
        let _ = (total_images, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopObserver;

impl AssemblyObserver for NoopObserver {}

/// Convenience alias matching the type stored in
/// [`crate::assemble::Assembler`].
pub type Observer = Arc<dyn AssemblyObserver>;
