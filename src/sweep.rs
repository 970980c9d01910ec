//! Housekeeping sweep over the spool directory.
//!
//! Per-request cleanup in [`crate::service`] is the correctness mechanism;
//! this sweep is the independent backstop that reclaims anything a crashed
//! process left behind. Age is judged by mtime against the configured
//! retention window. The operation is idempotent and safe to run repeatedly
//! or concurrently with itself: an entry that vanishes mid-sweep just counts
//! as an error for this pass and is gone either way.

use crate::config::SweepConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries (files or request directories) removed.
    pub deleted: usize,
    /// Entries that could not be inspected or removed.
    pub errors: usize,
}

/// Remove spool entries older than the retention window.
///
/// A missing spool root is a clean no-op: there is nothing to reclaim.
pub async fn sweep(config: &SweepConfig) -> SweepReport {
    let mut report = SweepReport::default();

    let mut entries = match tokio::fs::read_dir(&config.root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!(root = %config.root.display(), "Sweep could not read spool root: {e}");
            report.errors += 1;
            return report;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Sweep failed to advance directory listing: {e}");
                report.errors += 1;
                break;
            }
        };

        let age = match entry.metadata().await.and_then(|m| m.modified()) {
            // A modification time in the future reads as age zero and the
            // entry is kept for a later pass.
            Ok(mtime) => mtime.elapsed().unwrap_or(Duration::ZERO),
            Err(e) => {
                warn!(path = %entry.path().display(), "Sweep could not stat entry: {e}");
                report.errors += 1;
                continue;
            }
        };

        if age <= config.retention {
            continue;
        }

        let path = entry.path();
        let removal = if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };

        match removal {
            Ok(()) => {
                debug!(path = %path.display(), age_secs = age.as_secs(), "Swept expired entry");
                report.deleted += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), "Sweep failed to remove entry: {e}");
                report.errors += 1;
            }
        }
    }

    info!(
        root = %config.root.display(),
        deleted = report.deleted,
        errors = report.errors,
        "Sweep complete"
    );
    report
}
