//! Reconciliation of a document's assets directory against its references.
//!
//! Derives `<doc-stem>.assets` from the document path, diffs the image files
//! present there against the basenames the document references, and moves
//! the unused subset into a `deleted_images` backup subdirectory. One
//! blocking call per document; concurrent calls on the same assets directory
//! are the host's responsibility to serialize.

mod error;
mod run;

pub use error::MoveError;
pub use run::clean_assets;

use crate::assets::{self, ExtensionFilter};
use crate::extract;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Options for a cleanup or scan run, typically populated from config.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub extensions: ExtensionFilter,
}

/// Counters for one completed cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    /// Files successfully relocated into the backup directory.
    pub moved: u64,
    /// Size of the unused set at enumeration time.
    pub unused: u64,
    /// Candidates that vanished between enumeration and move.
    pub already_gone: u64,
    /// Candidates whose move failed (reported per file in the trace).
    pub failed: u64,
    pub elapsed: Duration,
}

impl CleanReport {
    pub(crate) fn empty(elapsed: Duration) -> Self {
        CleanReport {
            moved: 0,
            unused: 0,
            already_gone: 0,
            failed: 0,
            elapsed,
        }
    }
}

/// Result of a report-only scan: the three sets the cleanup would act on.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Basenames referenced by the document.
    pub in_use: BTreeSet<String>,
    /// Image files currently present in the assets directory.
    pub present: BTreeSet<String>,
    /// Present minus in-use: what a cleanup run would move.
    pub unused: BTreeSet<String>,
    /// False when the document could not be read (in-use degraded to empty).
    pub doc_readable: bool,
}

/// Compute the in-use/present/unused sets without touching the filesystem
/// beyond reads. Fails if the assets directory does not exist.
pub fn scan_assets(doc: &Path, opts: &CleanOptions) -> Result<ScanReport> {
    let assets_dir = assets::assets_dir_for(doc);
    if !assets_dir.is_dir() {
        anyhow::bail!("assets directory not found: {}", assets_dir.display());
    }

    let (in_use, doc_readable) = match extract::used_images_in_file(doc, &opts.extensions) {
        Ok(set) => (set, true),
        Err(err) => {
            tracing::warn!("cannot read {}: {}", doc.display(), err);
            (BTreeSet::new(), false)
        }
    };
    let present = assets::list_images(&assets_dir, &opts.extensions)
        .with_context(|| format!("failed to list {}", assets_dir.display()))?;
    let unused = present.difference(&in_use).cloned().collect();

    Ok(ScanReport {
        in_use,
        present,
        unused,
        doc_readable,
    })
}
