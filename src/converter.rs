//! Orchestration of one text → WAV conversion.
//!
//! ```text
//! Idle ──▶ Synthesizing ──▶ Transcoding ──▶ Done
//!               │                │
//!               └──────▶ Failed ◀┘
//! ```
//!
//! The provider's compressed audio goes into a [`TemporaryAudioArtifact`]
//! that is removed before [`TextToAudioConverter::convert`] returns, on
//! every path.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{ConversionError, Result};
use crate::provider::{GoogleTranslateTts, SpeechProvider};
use crate::request::ConversionRequest;
use crate::temp::TemporaryAudioArtifact;
use crate::transcode::{self, AudioTranscoder};
use crate::wav::{self, WavSummary};

/// Where a conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Synthesizing,
    Transcoding,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Synthesizing => "synthesizing",
            Self::Transcoding => "transcoding",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A provider and a transcoder, wired together.
pub struct TextToAudioConverter {
    provider: Box<dyn SpeechProvider>,
    transcoder: Box<dyn AudioTranscoder>,
    temp_dir: Option<PathBuf>,
}

impl TextToAudioConverter {
    pub fn new(provider: Box<dyn SpeechProvider>, transcoder: Box<dyn AudioTranscoder>) -> Self {
        Self { provider, transcoder, temp_dir: None }
    }

    /// Create temporary artifacts under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Google Translate voice plus the transcoder selected in `settings`.
    ///
    /// Fails early (before any network traffic) when the transcoder cannot
    /// be built, e.g. no ffmpeg could be located.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transcoder = transcode::build(settings)?;
        let provider = GoogleTranslateTts::new(settings.tld.clone(), settings.timeout());
        Ok(Self::new(Box::new(provider), transcoder).with_temp_dir(settings.temp_dir.clone()))
    }

    pub fn provider(&self) -> &dyn SpeechProvider {
        self.provider.as_ref()
    }

    pub fn transcoder(&self) -> &dyn AudioTranscoder {
        self.transcoder.as_ref()
    }

    /// Synthesize `request.text()` and write it as a 16 kHz mono 16-bit WAV
    /// at `request.output_path()`.
    ///
    /// Returns the header of the written file, already checked against
    /// [`wav::target_spec`].
    pub fn convert(&self, request: &ConversionRequest) -> Result<WavSummary> {
        let output = request.output_path();
        let output_existed = output.exists();
        let mut stage = Stage::Idle;
        tracing::debug!(stage = %stage, output = %output.display(), "conversion requested");

        let mut artifact = TemporaryAudioArtifact::create(self.temp_dir.as_deref())?;
        let outcome = self.run(request, &mut artifact, &mut stage);
        artifact.release();

        match outcome {
            Ok(summary) => {
                enter(&mut stage, Stage::Done);
                Ok(summary)
            }
            Err(e) => {
                tracing::debug!(stage = %stage, error = %e, "conversion failed");
                if stage == Stage::Transcoding && !output_existed {
                    discard_partial(output);
                }
                enter(&mut stage, Stage::Failed);
                Err(e)
            }
        }
    }

    fn run(
        &self,
        request: &ConversionRequest,
        artifact: &mut TemporaryAudioArtifact,
        stage: &mut Stage,
    ) -> Result<WavSummary> {
        enter(stage, Stage::Synthesizing);
        let written = self.provider.synthesize(
            request.text(),
            request.language(),
            request.slow(),
            artifact.writer()?,
        )?;
        artifact.flush()?;
        if written == 0 {
            return Err(ConversionError::EmptyAudio);
        }
        tracing::debug!(bytes = written, path = %artifact.path().display(), "provider audio stored");

        enter(stage, Stage::Transcoding);
        let output = request.output_path();
        self.transcoder.normalize(artifact.path(), output)?;

        let summary = wav::inspect(output)?;
        if !summary.matches_target() {
            return Err(ConversionError::TranscodeFailed(format!(
                "{} is {}, expected 16000 Hz, 1 ch, 16-bit PCM",
                output.display(),
                summary
            )));
        }
        tracing::debug!(%summary, seconds = summary.duration_secs(), "output verified");
        Ok(summary)
    }
}

fn enter(stage: &mut Stage, next: Stage) {
    tracing::debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}

/// Best-effort removal of a half-written output.
fn discard_partial(output: &Path) {
    if !output.exists() {
        return;
    }
    match std::fs::remove_file(output) {
        Ok(()) => tracing::debug!(path = %output.display(), "partial output removed"),
        Err(e) => tracing::debug!(path = %output.display(), error = %e, "could not remove partial output"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
