//! CLI binary for img2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! [`PdfOptions`]/[`Limits`], drives the router, and writes the result.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use img2pdf::{
    guess_mime, Assembler, AssemblyObserver, ImageInput, Limits, Margin, Orientation, PageSize,
    PdfOptions, RemoteClient, Router,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal progress: one bar advanced per composed page.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>2}/{len} images",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Composing");
        Arc::new(Self { bar })
    }
}

impl AssemblyObserver for CliProgress {
    fn on_start(&self, total_images: usize) {
        self.bar.set_length(total_images as u64);
    }

    fn on_image_done(&self, _index: usize, _total_images: usize) {
        self.bar.inc(1);
    }

    fn on_complete(&self, _total_images: usize, _pdf_bytes: usize) {
        self.bar.finish_and_clear();
    }
}

// ── Flag-level enums (mapped onto the library types) ─────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
    Fit,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Fit => PageSize::Fit,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

// ── Arguments ────────────────────────────────────────────────────────────────

/// Convert JPG/PNG images into a single PDF document.
#[derive(Parser, Debug)]
#[command(name = "img2pdf", version, about)]
struct Cli {
    /// Input images, in page order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file. Defaults to the derived `converted-images-<date>.pdf`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page size.
    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Page orientation.
    #[arg(long, value_enum, default_value = "portrait")]
    orientation: OrientationArg,

    /// Margin in millimetres (one of 0, 5, 10, 20).
    #[arg(long, default_value_t = 5)]
    margin: u8,

    /// JPEG re-encode quality, 1-100 (out-of-range values are clamped).
    #[arg(long, default_value_t = 85)]
    quality: u8,

    /// Raster DPI ceiling, 72-600 (out-of-range values are clamped).
    #[arg(long, default_value_t = 200)]
    max_dpi: u32,

    /// Remote conversion endpoint for payloads above the local limit.
    #[arg(long, env = "IMG2PDF_REMOTE_URL")]
    remote_url: Option<String>,

    /// Local-processing total limit in MB.
    #[arg(long, default_value_t = 25)]
    max_local_mb: u64,

    /// Remote-processing total limit in MB.
    #[arg(long, default_value_t = 100)]
    max_remote_mb: u64,

    /// Verbose logging (also honours RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "img2pdf=debug" } else { "img2pdf=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<ImageInput>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let Some(mime) = guess_mime(&name) else {
            bail!("'{name}': only .jpg/.jpeg/.png inputs are supported");
        };
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        images.push(ImageInput::new(name, mime, bytes));
    }
    Ok(images)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let margin = Margin::try_from(cli.margin)
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid --margin")?;

    let options = PdfOptions::builder()
        .page_size(cli.page_size.into())
        .orientation(cli.orientation.into())
        .margin(margin)
        .quality(cli.quality)
        .max_dpi(cli.max_dpi)
        .build();

    let limits = Limits {
        max_local_bytes: cli.max_local_mb * 1024 * 1024,
        max_remote_bytes: cli.max_remote_mb * 1024 * 1024,
        ..Limits::default()
    };

    let images = read_inputs(&cli.inputs)?;
    let count = images.len();

    let progress = CliProgress::new();
    let mut router =
        Router::new(limits).with_assembler(Assembler::new().with_observer(progress.clone()));
    if let Some(url) = &cli.remote_url {
        router = router.with_remote(RemoteClient::new(url));
    }

    let output = router
        .convert(images, options)
        .await
        .context("conversion failed")?;

    let out_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&output.file_name));
    std::fs::write(&out_path, &output.bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "{} {}  {}",
        green("✓"),
        bold(&out_path.display().to_string()),
        dim(&format!("{} pages, {} bytes", count, output.byte_len)),
    );

    Ok(())
}
