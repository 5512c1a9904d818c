use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_preview_limit() -> usize {
    50
}

/// Global configuration loaded from `~/.config/mdsweep/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdsweepConfig {
    /// Extra extensions (without the dot) treated as images in addition to
    /// the built-in set (png, jpg, jpeg, bmp, svg, tiff, webp, gif).
    #[serde(default)]
    pub extra_image_extensions: Vec<String>,
    /// Maximum number of per-file lines the CLI prints when listing a large
    /// scan result; further entries are summarized as a count.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl Default for MdsweepConfig {
    fn default() -> Self {
        Self {
            extra_image_extensions: Vec::new(),
            preview_limit: default_preview_limit(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdsweep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdsweepConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MdsweepConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("wrote default config to {}", path.display());
        return Ok(default_cfg);
    }
    let raw = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&raw)?;
    Ok(cfg)
}
