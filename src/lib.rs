//! # img2pdf
//!
//! Convert JPG/PNG images into a single PDF document.
//!
//! Each image becomes one page: the engine resolves a centred,
//! aspect-preserving placement rectangle from the page size, orientation,
//! and margin settings, resamples the image to the resolution that placement
//! actually needs at the configured DPI ceiling, recompresses it as JPEG at
//! the configured quality, and embeds it verbatim. Large payloads can be
//! delegated to a remote endpoint running the identical assembler, so both
//! execution paths produce the same layout.
//!
//! ## Pipeline Overview
//!
//! ```text
//! images + options
//!  │
//!  ├─ 1. Route     total size vs. the local/remote ceilings
//!  ├─ 2. Geometry  page rect, margin band, placement rect (per image)
//!  ├─ 3. Raster    resample to on-page resolution, re-encode JPEG
//!  ├─ 4. Compose   one PDF page per image, optional index stamp
//!  └─ 5. Assemble  serialise + derive `converted-images-<date>.pdf`
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2pdf::{assemble, ImageInput, PdfOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     let images = vec![ImageInput::new("photo.jpg", "image/jpeg", bytes)];
//!     let output = assemble(images, PdfOptions::default()).await?;
//!     std::fs::write(&output.file_name, &output.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! Size-limited routing goes through [`Router`] instead, and a server
//! embedding the remote half calls [`service::process_upload`] with the
//! parsed upload. The engine is all-or-nothing: a single unreadable image
//! fails the whole conversion with an error naming that file.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! img2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod progress;
pub mod remote;
pub mod router;
pub mod service;
pub mod sweep;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble, Assembler, CancelFlag, ConversionOutput, PDF_MIME};
pub use config::{Limits, Margin, Orientation, PageSize, PdfOptions, PdfOptionsBuilder, SweepConfig};
pub use error::ConvertError;
pub use input::{guess_mime, ImageInput};
pub use progress::{AssemblyObserver, NoopObserver, Observer};
pub use remote::RemoteClient;
pub use router::{decide, ExecutionPath, Router};
pub use sweep::{sweep, SweepReport};
