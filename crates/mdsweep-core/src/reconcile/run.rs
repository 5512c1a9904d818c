//! The cleanup run: enumerate, diff, move, trace.

use super::error::{move_to_backup, MoveError};
use super::{CleanOptions, CleanReport};
use crate::assets::{self, BACKUP_DIR_NAME};
use crate::control::CancelToken;
use crate::events::{CleanEvent, EventSink, FileOutcome, LogLevel};
use crate::extract;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

fn log(sink: &mut dyn EventSink, level: LogLevel, message: String) {
    sink.emit(CleanEvent::Log { level, message });
}

fn progress(sink: &mut dyn EventSink, percent: u8, stage: impl Into<String>) {
    sink.emit(CleanEvent::Progress {
        percent,
        stage: stage.into(),
    });
}

/// Move every image in `doc`'s assets directory that the document no longer
/// references into the `deleted_images` backup subdirectory.
///
/// Expected conditions (missing assets dir, unreadable document, vanished or
/// unmovable files) become trace events and the run completes cleanly; only
/// unanticipated failures return `Err`. The final event of an `Ok` run is
/// always `Summary`. Cancellation is honored between per-file moves.
pub fn clean_assets(
    doc: &Path,
    opts: &CleanOptions,
    sink: &mut dyn EventSink,
    cancel: &CancelToken,
) -> Result<CleanReport> {
    let start = Instant::now();
    let doc_name = doc
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| doc.display().to_string());
    progress(sink, 5, format!("analyzing {}", doc_name));

    let assets_dir = assets::assets_dir_for(doc);
    if !assets_dir.is_dir() {
        log(
            sink,
            LogLevel::Error,
            format!("assets directory not found: {}", assets_dir.display()),
        );
        let report = CleanReport::empty(start.elapsed());
        finish(sink, &report);
        return Ok(report);
    }

    progress(sink, 15, "scanning references");
    let in_use = match extract::used_images_in_file(doc, &opts.extensions) {
        Ok(set) => set,
        Err(err) => {
            // An unreadable document degrades to an empty reference set,
            // which classifies every image as unused.
            log(
                sink,
                LogLevel::Warn,
                format!(
                    "cannot read {}: {}; treating every image as unreferenced",
                    doc.display(),
                    err
                ),
            );
            BTreeSet::new()
        }
    };
    if in_use.is_empty() {
        log(
            sink,
            LogLevel::Warn,
            "no referenced images found in the document".to_string(),
        );
    }

    let present = assets::list_images(&assets_dir, &opts.extensions)
        .with_context(|| format!("failed to list {}", assets_dir.display()))?;
    progress(sink, 20, "analyzing image references");
    if present.is_empty() {
        log(
            sink,
            LogLevel::Info,
            format!("no image files found in {}", assets_dir.display()),
        );
        let report = CleanReport::empty(start.elapsed());
        finish(sink, &report);
        return Ok(report);
    }
    log(
        sink,
        LogLevel::Info,
        format!("found {} image(s) in {}", present.len(), assets_dir.display()),
    );

    let unused: Vec<String> = present.difference(&in_use).cloned().collect();
    progress(sink, 25, format!("{} unreferenced image(s)", unused.len()));
    if unused.is_empty() {
        log(sink, LogLevel::Info, "nothing to clean".to_string());
        let report = CleanReport::empty(start.elapsed());
        finish(sink, &report);
        return Ok(report);
    }

    progress(sink, 45, "preparing cleanup");
    let backup_dir = assets_dir.join(BACKUP_DIR_NAME);
    let total = unused.len();
    let mut moved = 0u64;
    let mut already_gone = 0u64;
    let mut failed = 0u64;

    for (i, name) in unused.iter().enumerate() {
        if cancel.is_cancelled() {
            log(
                sink,
                LogLevel::Warn,
                format!("cancelled with {} file(s) left", total - i),
            );
            break;
        }
        // Backup dir is created lazily, once, and only when a move is due.
        if i == 0 && !backup_dir.is_dir() {
            std::fs::create_dir_all(&backup_dir)
                .with_context(|| format!("failed to create {}", backup_dir.display()))?;
            log(
                sink,
                LogLevel::Info,
                format!("created backup folder {}", backup_dir.display()),
            );
        }

        let outcome = match move_to_backup(&assets_dir.join(name), &backup_dir.join(name)) {
            Ok(()) => {
                moved += 1;
                FileOutcome::Moved
            }
            Err(MoveError::Vanished) => {
                already_gone += 1;
                FileOutcome::AlreadyGone
            }
            Err(err) => {
                failed += 1;
                tracing::warn!("cannot move {}: {}", name, err);
                FileOutcome::Failed(err.to_string())
            }
        };
        sink.emit(CleanEvent::File {
            name: name.clone(),
            outcome,
        });
        let percent = (50 + 45 * (i + 1) / total) as u8;
        progress(sink, percent, format!("cleaned {}/{}", i + 1, total));
    }

    let report = CleanReport {
        moved,
        unused: total as u64,
        already_gone,
        failed,
        elapsed: start.elapsed(),
    };
    finish(sink, &report);
    tracing::info!(
        "cleaned {}: moved={} unused={} failed={}",
        doc.display(),
        report.moved,
        report.unused,
        report.failed
    );
    Ok(report)
}

fn finish(sink: &mut dyn EventSink, report: &CleanReport) {
    progress(sink, 100, "cleanup complete");
    sink.emit(CleanEvent::Summary {
        moved: report.moved,
        unused: report.unused,
        elapsed: report.elapsed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Trace;
    use std::path::PathBuf;

    fn fixture(doc_text: &str, files: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, doc_text).unwrap();
        let assets = dir.path().join("doc.assets");
        std::fs::create_dir(&assets).unwrap();
        for name in files {
            std::fs::write(assets.join(name), b"img").unwrap();
        }
        (dir, doc)
    }

    fn run(doc: &Path) -> (CleanReport, Vec<CleanEvent>) {
        let mut trace = Trace::new();
        let report = clean_assets(doc, &CleanOptions::default(), &mut trace, &CancelToken::new())
            .expect("run should not fail");
        (report, trace.into_events())
    }

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn moves_unreferenced_images_to_backup() {
        let (_dir, doc) = fixture(
            "# notes\n![x](img/photo1.png)\n",
            &["photo1.png", "photo2.png", "old.gif"],
        );
        let (report, events) = run(&doc);

        assert_eq!(report.moved, 2);
        assert_eq!(report.unused, 2);
        assert_eq!(report.failed, 0);

        let assets = doc.with_extension("assets");
        let backup = assets.join(BACKUP_DIR_NAME);
        assert_eq!(dir_names(&backup), vec!["old.gif", "photo2.png"]);
        assert!(assets.join("photo1.png").exists());
        assert!(!assets.join("photo2.png").exists());

        assert!(matches!(events.last(), Some(CleanEvent::Summary { moved: 2, .. })));
        let mut moved_files: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                CleanEvent::File {
                    name,
                    outcome: FileOutcome::Moved,
                } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        moved_files.sort_unstable();
        assert_eq!(moved_files, vec!["old.gif", "photo2.png"]);
    }

    #[test]
    fn second_run_is_idempotent() {
        let (_dir, doc) = fixture("![x](a.png)", &["a.png", "b.png"]);
        let (first, _) = run(&doc);
        assert_eq!(first.moved, 1);

        let (second, events) = run(&doc);
        assert_eq!(second.moved, 0);
        assert_eq!(second.unused, 0);
        // The backed-up file must not be re-detected through the backup dir.
        let backup = doc.with_extension("assets").join(BACKUP_DIR_NAME);
        assert_eq!(dir_names(&backup), vec!["b.png"]);
        assert!(matches!(events.last(), Some(CleanEvent::Summary { moved: 0, .. })));
    }

    #[test]
    fn missing_assets_dir_reports_and_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, "![x](a.png)").unwrap();

        let (report, events) = run(&doc);
        assert_eq!(report.moved, 0);
        assert!(events.iter().any(|e| matches!(
            e,
            CleanEvent::Log {
                level: LogLevel::Error,
                ..
            }
        )));
        assert!(matches!(events.last(), Some(CleanEvent::Summary { moved: 0, .. })));
    }

    #[test]
    fn nothing_to_clean_creates_no_backup_dir() {
        let (_dir, doc) = fixture("![a](a.png) [b](b.png)", &["a.png", "b.png"]);
        let (report, events) = run(&doc);
        assert_eq!(report.moved, 0);
        assert!(!doc.with_extension("assets").join(BACKUP_DIR_NAME).exists());
        assert!(events.iter().any(|e| matches!(
            e,
            CleanEvent::Log { message, .. } if message == "nothing to clean"
        )));
    }

    #[test]
    fn non_image_files_are_never_candidates() {
        let (_dir, doc) = fixture("no links", &["notes.txt"]);
        let assets = doc.with_extension("assets");
        std::fs::write(assets.join("data.csv"), b"1,2").unwrap();

        let (report, _) = run(&doc);
        assert_eq!(report.moved, 0);
        assert!(assets.join("notes.txt").exists());
        assert!(assets.join("data.csv").exists());
    }

    #[test]
    fn unreadable_document_degrades_to_empty_reference_set() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.md");
        let assets = dir.path().join("doc.assets");
        std::fs::create_dir(&assets).unwrap();
        std::fs::write(assets.join("a.png"), b"img").unwrap();

        let (report, events) = run(&doc);
        assert_eq!(report.moved, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            CleanEvent::Log {
                level: LogLevel::Warn,
                ..
            }
        )));
    }

    #[test]
    fn one_failing_move_does_not_abort_the_batch() {
        let (_dir, doc) = fixture("no refs", &["photo2.png", "old.gif"]);
        let assets = doc.with_extension("assets");
        // Occupy photo2.png's backup slot with a non-empty directory so its
        // rename fails while old.gif still moves.
        let backup = assets.join(BACKUP_DIR_NAME);
        std::fs::create_dir_all(backup.join("photo2.png")).unwrap();
        std::fs::write(backup.join("photo2.png").join("blocker"), b"x").unwrap();

        let (report, events) = run(&doc);
        assert_eq!(report.moved, 1);
        assert_eq!(report.failed, 1);
        assert!(backup.join("old.gif").is_file());
        assert!(assets.join("photo2.png").is_file());
        assert!(events.iter().any(|e| matches!(
            e,
            CleanEvent::File {
                name,
                outcome: FileOutcome::Failed(_),
            } if name == "photo2.png"
        )));
        assert!(matches!(events.last(), Some(CleanEvent::Summary { moved: 1, .. })));
    }

    #[test]
    fn cancelled_token_stops_before_any_move() {
        let (_dir, doc) = fixture("no refs", &["a.png", "b.png"]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut trace = Trace::new();
        let report =
            clean_assets(&doc, &CleanOptions::default(), &mut trace, &cancel).unwrap();
        assert_eq!(report.moved, 0);
        let assets = doc.with_extension("assets");
        assert!(assets.join("a.png").exists());
        assert!(assets.join("b.png").exists());
        assert!(matches!(
            trace.events().last(),
            Some(CleanEvent::Summary { moved: 0, .. })
        ));
    }
}
