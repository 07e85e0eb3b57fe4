//! External-process transcoder.
//!
//! Runs, with stderr captured:
//!
//! ```text
//! ffmpeg -hide_banner -loglevel error -i <in> -acodec pcm_s16le -ar 16000 -ac 1 -f wav -y <out>
//! ```
//!
//! `-f wav` lets the output path carry any extension; `-y` overwrites an
//! existing file without prompting.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::locate::{is_bare_command, Locator, ProbeEnv};
use super::AudioTranscoder;
use crate::error::{ConversionError, Result};
use crate::wav::{TARGET_CHANNELS, TARGET_SAMPLE_RATE};

/// Shells out to an `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Use `program` as-is (a path, or a bare name resolved via `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Resolve the executable with `locator`.
    ///
    /// A resolved path that is not a bare command name must exist; this is
    /// what makes an explicit override authoritative.
    pub fn locate(locator: &Locator, env: &ProbeEnv) -> Result<Self> {
        let program = locator.resolve(env)?;
        if !is_bare_command(&program) && !program.is_file() {
            return Err(ConversionError::TranscoderNotFound(format!(
                "{} does not exist",
                program.display()
            )));
        }
        Ok(Self::new(program))
    }

    fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(
            [
                "-acodec".to_string(),
                "pcm_s16le".to_string(),
                "-ar".to_string(),
                TARGET_SAMPLE_RATE.to_string(),
                "-ac".to_string(),
                TARGET_CHANNELS.to_string(),
                "-f".to_string(),
                "wav".to_string(),
                "-y".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl AudioTranscoder for FfmpegTranscoder {
    fn describe(&self) -> String {
        format!("ffmpeg ({})", self.program.display())
    }

    fn normalize(&self, input: &Path, output: &Path) -> Result<()> {
        let args = Self::args(input, output);
        tracing::debug!(program = %self.program.display(), ?args, "spawning ffmpeg");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConversionError::TranscoderNotFound(format!(
                    "cannot execute {}: {}",
                    self.program.display(),
                    e
                )))
            }
            Err(e) => {
                return Err(ConversionError::io(
                    format!("cannot run {}", self.program.display()),
                    e,
                ))
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let stderr = stderr.trim();
            return Err(ConversionError::TranscodeFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                out.status,
                if stderr.is_empty() { "(no output)" } else { stderr }
            )));
        }

        if !output.is_file() {
            return Err(ConversionError::TranscodeFailed(format!(
                "{} reported success but wrote no {}",
                self.program.display(),
                output.display()
            )));
        }

        tracing::info!(output = %output.display(), "ffmpeg transcoding finished");
        Ok(())
    }
}
