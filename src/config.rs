//! Runtime settings read from the environment (and `.env`, loaded in `main`).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PDF_URL: &str = "https://multipass.wizzair.com/aycf-availability.pdf";
pub const DEFAULT_LOG_FILE: &str = "logs/aycf_tracker.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where the availability document is published.
    pub pdf_url: String,
    /// Snapshot CSV directory.
    pub data_dir: PathBuf,
    /// Downloaded document archive.
    pub pdf_dir: PathBuf,
    /// Optional airport coordinate file for map output.
    pub coordinates: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pdf_url: DEFAULT_PDF_URL.to_string(),
            data_dir: PathBuf::from("data"),
            pdf_dir: PathBuf::from("pdfs"),
            coordinates: None,
            fetch_timeout: Duration::from_secs(10),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("AYCF_PDF_URL") {
            settings.pdf_url = url;
        }
        if let Some(dir) = get("AYCF_DATA_DIR") {
            settings.data_dir = dir.into();
        }
        if let Some(dir) = get("AYCF_PDF_DIR") {
            settings.pdf_dir = dir.into();
        }
        settings.coordinates = get("AYCF_COORDINATES").map(PathBuf::from);
        if let Some(secs) = get("AYCF_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("AYCF_FETCH_TIMEOUT_SECS must be whole seconds, got {secs:?}"))?;
            settings.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("LOG_FILE_PATH") {
            settings.log_file = path.into();
        }

        Ok(settings)
    }
}
