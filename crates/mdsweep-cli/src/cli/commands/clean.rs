//! Clean command: run the reconciler and render its event stream.

use super::options_from_config;
use anyhow::Result;
use mdsweep_core::config::MdsweepConfig;
use mdsweep_core::control::CancelToken;
use mdsweep_core::events::{CleanEvent, FileOutcome, LogLevel};
use mdsweep_core::reconcile;
use std::path::Path;

/// Run the cleanup on one document, printing the trace as it arrives.
pub fn run_clean(file: &Path, cfg: &MdsweepConfig, quiet: bool) -> Result<()> {
    let opts = options_from_config(cfg);
    let mut sink = |event: CleanEvent| render(event, quiet);
    let report = reconcile::clean_assets(file, &opts, &mut sink, &CancelToken::new())?;
    tracing::debug!("clean finished: {:?}", report);
    Ok(())
}

fn render(event: CleanEvent, quiet: bool) {
    match event {
        CleanEvent::Progress { percent, stage } => {
            if !quiet {
                println!("[{:3}%] {}", percent, stage);
            }
        }
        CleanEvent::Log { level, message } => match level {
            LogLevel::Error => eprintln!("error: {}", message),
            LogLevel::Warn => eprintln!("warning: {}", message),
            LogLevel::Info => {
                if !quiet {
                    println!("{}", message);
                }
            }
        },
        CleanEvent::File { name, outcome } => {
            if quiet {
                return;
            }
            match outcome {
                FileOutcome::Moved => println!("moved: {} -> deleted_images", name),
                FileOutcome::AlreadyGone => println!("already gone: {}", name),
                FileOutcome::Failed(cause) => eprintln!("error: cannot move {}: {}", name, cause),
            }
        }
        CleanEvent::Summary {
            moved,
            unused,
            elapsed,
        } => {
            println!(
                "done: moved {} of {} unreferenced image(s) in {:.2}s",
                moved,
                unused,
                elapsed.as_secs_f64()
            );
        }
    }
}
