//! Assets directory derivation and image enumeration.
//!
//! A Markdown document `notes.md` pairs with a sibling `notes.assets`
//! directory (Typora layout). Only direct children of that directory are
//! cleanup candidates; the `deleted_images` backup subdirectory and any
//! other subdirectory are never scanned.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the backup subdirectory created inside the assets directory.
pub const BACKUP_DIR_NAME: &str = "deleted_images";

/// File extensions treated as images (matched case-insensitively).
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "svg", "tiff", "webp", "gif"];

/// Derive the assets directory for a document: strip the final extension and
/// append the literal `.assets` suffix (`doc.md` -> `doc.assets`).
pub fn assets_dir_for(doc: &Path) -> PathBuf {
    doc.with_extension("assets")
}

/// Case-insensitive extension allow-list: the fixed image set plus any extra
/// extensions supplied via config.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extra: Vec<String>,
}

impl ExtensionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add extra extensions (given without the leading dot) to the fixed set.
    pub fn with_extra(extra: &[String]) -> Self {
        ExtensionFilter {
            extra: extra.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    /// Whether `name` ends in an allowed extension. The name itself is not
    /// case-folded; only the extension comparison ignores case.
    pub fn matches(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str()) || self.extra.iter().any(|e| *e == ext)
    }
}

/// List image files directly under `dir` (non-recursive). Subdirectories,
/// including a prior `deleted_images` backup, are skipped because only plain
/// files are considered. Names that are not valid UTF-8 are skipped.
pub fn list_images(dir: &Path, filter: &ExtensionFilter) -> io::Result<BTreeSet<String>> {
    let mut images = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("skipping non-UTF-8 file name in {}", dir.display());
            continue;
        };
        if filter.matches(&name) {
            images.insert(name);
        }
    }
    Ok(images)
}
