//! Scan command: report-only set computation, no filesystem mutation.

use super::options_from_config;
use anyhow::Result;
use mdsweep_core::config::MdsweepConfig;
use mdsweep_core::reconcile;
use std::path::Path;

/// Print the in-use/present/unused breakdown for one document.
pub fn run_scan(file: &Path, cfg: &MdsweepConfig) -> Result<()> {
    let opts = options_from_config(cfg);
    let report = reconcile::scan_assets(file, &opts)?;

    if !report.doc_readable {
        eprintln!(
            "warning: {} could not be read; every image counts as unreferenced",
            file.display()
        );
    }
    println!("referenced images: {}", report.in_use.len());
    println!("images present:    {}", report.present.len());
    println!("unreferenced:      {}", report.unused.len());

    for name in report.unused.iter().take(cfg.preview_limit) {
        println!("  {}", name);
    }
    let remaining = report.unused.len().saturating_sub(cfg.preview_limit);
    if remaining > 0 {
        println!("  ... and {} more", remaining);
    }
    Ok(())
}
