use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tracing::warn;

/// Paths and font sources the renderer needs; supplied by the caller.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Where generated PDFs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Where downloaded fonts are kept.
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// URL templates tried in order; `{family}` and `{weight}` are substituted.
    #[serde(default = "default_font_sources")]
    pub font_sources: Vec<String>,

    /// Directory public photo URLs (`/uploads/...`) resolve against.
    #[serde(default = "default_public_root")]
    pub public_root: PathBuf,

    /// JSON key-value store holding the layout fingerprint.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_timeout")]
    pub download_timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    data_dir().join("pdfs")
}

fn default_fonts_dir() -> PathBuf {
    data_dir().join("fonts")
}

fn default_font_family() -> String {
    "Roboto".to_string()
}

fn default_font_sources() -> Vec<String> {
    vec![
        "https://github.com/googlefonts/roboto/raw/main/src/hinted/{family}-{weight}.ttf".to_string(),
        "https://cdn.jsdelivr.net/gh/googlefonts/roboto@main/src/hinted/{family}-{weight}.ttf".to_string(),
    ]
}

fn default_public_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_store_path() -> PathBuf {
    data_dir().join("config-store.json")
}

fn default_timeout() -> u64 { 20 }

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            fonts_dir: default_fonts_dir(),
            font_family: default_font_family(),
            font_sources: default_font_sources(),
            public_root: default_public_root(),
            store_path: default_store_path(),
            download_timeout_secs: default_timeout(),
        }
    }
}

/// Platform data directory, or `./data` when the platform has none.
fn data_dir() -> PathBuf {
    ProjectDirs::from("ro", "Cofetarie", "bakery-docs")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl RenderSettings {
    /// Load from disk, or use defaults if missing or invalid.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => return settings,
                Err(e) => warn!(path = ?path, error = %e, "Invalid settings file, using defaults"),
            },
            Err(e) => warn!(path = ?path, error = %e, "Settings file not readable, using defaults"),
        }
        Self::default()
    }

    /// Save to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
