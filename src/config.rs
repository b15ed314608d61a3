//! Process-wide configuration: backend credentials, defaults and disks.
//!
//! Sources, later ones win:
//! 1. built-in defaults
//! 2. the TOML file named by `PDF_SERVICE_CONFIG`
//! 3. `PDF_SERVICE_URL` / `PDF_SERVICE_KEY`
//!
//! ```toml
//! url = "https://gotenberg.internal"
//! key = "secret"
//! wait_delay = "1s"
//! default_disk = "local"
//!
//! [disks.local]
//! driver = "local"
//! root = "storage/app"
//!
//! [disks.scratch]
//! driver = "memory"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

pub const ENV_CONFIG_PATH: &str = "PDF_SERVICE_CONFIG";
pub const ENV_URL: &str = "PDF_SERVICE_URL";
pub const ENV_KEY: &str = "PDF_SERVICE_KEY";

/// Default wait before the browser prints the page.
pub const DEFAULT_WAIT_DELAY: &str = "500ms";

/// Default HTTP timeout for the backend call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering backend base URL.
    pub url: String,
    /// Value sent as `X-Api-Key`.
    pub key: String,
    /// Initial wait delay for new services.
    pub wait_delay: String,
    /// Backend request timeout.
    pub timeout_secs: u64,
    /// Disk used when none is selected.
    pub default_disk: String,
    /// Named storage backends.
    pub disks: BTreeMap<String, DiskConfig>,
}

/// One `[disks.<name>]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum DiskConfig {
    /// Files below `root`.
    Local { root: PathBuf },
    /// Process-local, lost on exit.
    Memory,
}

impl Default for Config {
    fn default() -> Self {
        let mut disks = BTreeMap::new();
        disks.insert("local".to_string(), DiskConfig::Local { root: PathBuf::from("storage") });

        Self {
            url: String::new(),
            key: String::new(),
            wait_delay: DEFAULT_WAIT_DELAY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_disk: "local".to_string(),
            disks,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self, PdfError> {
        let path = std::env::var(ENV_CONFIG_PATH).ok().filter(|p| !p.is_empty());
        let config = match path {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, PdfError> {
        toml::from_str(toml_str).map_err(|e| PdfError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, PdfError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PdfError::Config(format!("reading '{}': {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `PDF_SERVICE_URL` / `PDF_SERVICE_KEY` overrides from `lookup`.
    /// Empty values are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(key) = lookup(ENV_KEY).filter(|v| !v.is_empty()) {
            self.key = key;
        }
        self
    }

    /// Whether a disk called `name` is configured.
    pub fn has_disk(&self, name: &str) -> bool {
        self.disks.contains_key(name)
    }
}
