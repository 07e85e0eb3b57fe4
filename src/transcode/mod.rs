//! Audio transcoders — provider output in, [`target_spec`](crate::wav::target_spec) WAV out.
//!
//! Two interchangeable strategies, picked once at construction time:
//!
//! | Backend   | How                                              | Needs                |
//! |-----------|--------------------------------------------------|----------------------|
//! | `ffmpeg`  | spawns an `ffmpeg` process (see [`locate`])      | an ffmpeg executable |
//! | `library` | symphonia decode → downmix → rubato → hound      | the `library` feature |
//!
//! Both must end with 16 kHz, mono, 16-bit PCM; the converter checks the
//! header afterwards.

pub mod ffmpeg;
#[cfg(feature = "library")]
pub mod library;
pub mod locate;

use std::path::Path;

use serde::Deserialize;

use crate::config::Settings;
use crate::error::Result;

pub use ffmpeg::FfmpegTranscoder;
#[cfg(feature = "library")]
pub use library::LibraryTranscoder;
pub use locate::{Locator, ProbeEnv};

/// Normalises an encoded audio file into the fixed output format.
pub trait AudioTranscoder {
    /// Human-readable identification, e.g. `ffmpeg (/usr/bin/ffmpeg)`.
    fn describe(&self) -> String;

    /// Decode `input`, resample to 16 kHz mono, and write a 16-bit WAV to
    /// `output` (overwriting it).
    fn normalize(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Which [`AudioTranscoder`] to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscoderBackend {
    /// External `ffmpeg` process.
    #[default]
    Ffmpeg,
    /// In-process decoding and resampling.
    Library,
}

impl std::fmt::Display for TranscoderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ffmpeg => write!(f, "ffmpeg"),
            Self::Library => write!(f, "library"),
        }
    }
}

impl std::str::FromStr for TranscoderBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ffmpeg" => Ok(Self::Ffmpeg),
            "library" | "lib" => Ok(Self::Library),
            _ => Err(format!("Invalid transcoder backend: {} (expected ffmpeg or library)", s)),
        }
    }
}

/// Build the transcoder selected by `settings`.
///
/// For `ffmpeg` this also resolves the executable, so a missing binary is
/// reported before any network traffic happens.
pub fn build(settings: &Settings) -> Result<Box<dyn AudioTranscoder>> {
    match settings.backend {
        TranscoderBackend::Ffmpeg => {
            let env = ProbeEnv::capture(settings)?;
            let transcoder = FfmpegTranscoder::locate(&Locator::standard(), &env)?;
            Ok(Box::new(transcoder))
        }
        #[cfg(feature = "library")]
        TranscoderBackend::Library => Ok(Box::new(LibraryTranscoder::new())),
        #[cfg(not(feature = "library"))]
        TranscoderBackend::Library => Err(crate::error::ConversionError::Config(
            "the library backend was not compiled in (enable the `library` feature)".to_string(),
        )),
    }
}
