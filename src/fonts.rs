//! Font provisioning: make sure a regular/bold TrueType pair is on disk,
//! downloading it from fallback sources when missing.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use krilla::text::Font;
use tracing::{debug, info, warn};

/// Which fonts the painter should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    /// Both weights of the configured family are on disk.
    Family { regular: PathBuf, bold: PathBuf },
    /// Use the bundled font for both weights.
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Bold => "Bold",
        }
    }
}

/// Fetches raw bytes from a remote source.
pub trait FontFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl FontFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("HTTP request failed: {}", url))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .context("Failed to read response")?;
        Ok(bytes)
    }
}

/// Ensures `<family>-Regular.ttf` and `<family>-Bold.ttf` exist in `dir`.
pub struct FontProvisioner {
    pub dir: PathBuf,
    pub family: String,
    /// URL templates tried in order; `{family}` and `{weight}` are substituted.
    pub sources: Vec<String>,
}

impl FontProvisioner {
    pub fn new(dir: impl Into<PathBuf>, family: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            family: family.into(),
            sources,
        }
    }

    pub fn font_path(&self, weight: FontWeight) -> PathBuf {
        self.dir.join(format!("{}-{}.ttf", self.family, weight.as_str()))
    }

    /// Returns the family pair when both weights are available, otherwise
    /// [`FontChoice::Builtin`]. Never fails.
    pub fn ensure(&self, fetcher: &dyn FontFetcher) -> FontChoice {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = ?self.dir, error = %err, "Failed to create fonts directory");
            return FontChoice::Builtin;
        }

        let regular = self.ensure_weight(FontWeight::Regular, fetcher);
        let bold = self.ensure_weight(FontWeight::Bold, fetcher);

        match (regular, bold) {
            (Some(regular), Some(bold)) => FontChoice::Family { regular, bold },
            _ => {
                warn!(family = %self.family, "Font pair incomplete, using builtin font");
                FontChoice::Builtin
            }
        }
    }

    fn ensure_weight(&self, weight: FontWeight, fetcher: &dyn FontFetcher) -> Option<PathBuf> {
        let path = self.font_path(weight);
        if path.is_file() {
            debug!(path = ?path, "Font already present");
            return Some(path);
        }

        for template in &self.sources {
            let url = template
                .replace("{family}", &self.family)
                .replace("{weight}", weight.as_str());
            match fetcher.fetch(&url).and_then(|bytes| check_font_bytes(&bytes).map(|_| bytes)) {
                Ok(bytes) => match fs::write(&path, &bytes) {
                    Ok(()) => {
                        info!(url = %url, path = ?path, bytes = bytes.len(), "Font downloaded");
                        return Some(path);
                    }
                    Err(err) => {
                        warn!(path = ?path, error = %err, "Failed to persist font");
                        return None;
                    }
                },
                Err(err) => {
                    warn!(url = %url, error = %err, "Font source failed");
                }
            }
        }
        None
    }
}

/// Rejects payloads that are not TrueType/OpenType (e.g. HTML error pages).
fn check_font_bytes(bytes: &[u8]) -> anyhow::Result<()> {
    match bytes.get(..4) {
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"true") | Some(b"OTTO") => Ok(()),
        _ => Err(anyhow!("response is not a TrueType/OpenType font ({} bytes)", bytes.len())),
    }
}

// Bundled fallback pair, always available.
const BUNDLED_REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Loaded krilla fonts for both weights.
///
/// `None` only for a hand-built empty set; the painter then omits text.
#[derive(Clone, Default)]
pub struct FontFaces {
    pub regular: Option<Font>,
    pub bold: Option<Font>,
}

impl FontFaces {
    /// Loads the chosen pair, falling back to the bundled pair for both
    /// weights if either file fails to load.
    pub fn load(choice: &FontChoice) -> Self {
        if let FontChoice::Family { regular, bold } = choice {
            match (load_font_file(regular), load_font_file(bold)) {
                (Ok(regular), Ok(bold)) => {
                    return Self {
                        regular: Some(regular),
                        bold: Some(bold),
                    }
                }
                (Err(err), _) | (_, Err(err)) => {
                    warn!(error = %err, "Failed to load font pair, using builtin font");
                }
            }
        }
        Self::builtin()
    }

    /// The DejaVu Sans pair compiled into the binary.
    pub fn builtin() -> Self {
        let regular = Font::new(BUNDLED_REGULAR.to_vec().into(), 0);
        let bold = Font::new(BUNDLED_BOLD.to_vec().into(), 0);
        if regular.is_none() || bold.is_none() {
            warn!("Bundled font failed to parse");
        }
        Self { regular, bold }
    }

    /// Face for `weight`, falling back to the other weight.
    pub fn get(&self, weight: FontWeight) -> Option<&Font> {
        match weight {
            FontWeight::Regular => self.regular.as_ref().or(self.bold.as_ref()),
            FontWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
        }
    }
}

fn load_font_file(path: &Path) -> anyhow::Result<Font> {
    let data = fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    Font::new(data.into(), 0).ok_or_else(|| anyhow!("Failed to parse font {}", path.display()))
}
