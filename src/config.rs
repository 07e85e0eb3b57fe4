//! Optional JSON settings file.
//!
//! Every field is optional; missing fields take the built-in default and
//! unknown fields are rejected so typos surface immediately:
//!
//! ```json
//! {
//!   "backend": "library",
//!   "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg",
//!   "search_path_fallback": false,
//!   "tld": "com.br",
//!   "timeout_secs": 30,
//!   "temp_dir": "/var/tmp"
//! }
//! ```
//!
//! Command-line flags and their environment variables override whatever the
//! file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::provider::DEFAULT_TLD;
use crate::transcode::TranscoderBackend;

/// Deserialised settings file, merged with CLI overrides by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Transcoder strategy.
    pub backend: TranscoderBackend,

    /// Explicit ffmpeg executable; skips every other lookup.
    pub ffmpeg_path: Option<PathBuf>,

    /// Allow the bare `ffmpeg` name as the last lookup step.
    pub search_path_fallback: bool,

    /// Top-level domain of the Google Translate host.
    pub tld: String,

    /// Global timeout for each HTTP request, in seconds.
    pub timeout_secs: Option<u64>,

    /// Where the temporary MP3 is created (system temp dir when unset).
    pub temp_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: TranscoderBackend::default(),
            ffmpeg_path: None,
            search_path_fallback: true,
            tld: DEFAULT_TLD.to_string(),
            timeout_secs: None,
            temp_dir: None,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    /// Read and parse the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read settings file: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// HTTP timeout, if one is configured. Zero means "no timeout".
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|&s| s > 0).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
        assert!(Settings::default().search_path_fallback);
        assert_eq!(Settings::default().tld, "com");
    }

    #[test]
    fn test_full_file() {
        let s = Settings::from_json(
            r#"{
                "backend": "library",
                "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg",
                "search_path_fallback": false,
                "tld": "com.br",
                "timeout_secs": 30,
                "temp_dir": "/var/tmp"
            }"#,
        )
        .unwrap();
        assert_eq!(s.backend, TranscoderBackend::Library);
        assert_eq!(s.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert!(!s.search_path_fallback);
        assert_eq!(s.tld, "com.br");
        assert_eq!(s.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(s.temp_dir, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Settings::from_json(r#"{ "bakend": "ffmpeg" }"#).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Settings::from_json(r#"{ "backend": "sox" }"#).is_err());
    }

    #[test]
    fn test_zero_timeout_disabled() {
        let s = Settings { timeout_secs: Some(0), ..Settings::default() };
        assert_eq!(s.timeout(), None);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("tts2wav.json");
        let err = Settings::load(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("tts2wav.json"));

        std::fs::write(&missing, r#"{ "tld": "pt" }"#).unwrap();
        assert_eq!(Settings::load(&missing).unwrap().tld, "pt");
    }
}
