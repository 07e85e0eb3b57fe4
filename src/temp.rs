//! Scoped temporary file for the provider's compressed audio.
//!
//! The artifact lives for exactly one conversion. It is removed by
//! [`TemporaryAudioArtifact::release`] or, on any early return, by `Drop`.
//! Removal failures are logged at debug level and never escalated.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ConversionError, Result};

const PREFIX: &str = "tts2wav-";
const SUFFIX: &str = ".mp3";

/// An ephemeral `.mp3` file owned by the converter.
pub struct TemporaryAudioArtifact {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl TemporaryAudioArtifact {
    /// Create an empty artifact in `dir`, or in the system temp directory.
    pub fn create(dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX).suffix(SUFFIX);
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ConversionError::io("cannot create temporary audio file", e))?;

        let path = file.path().to_path_buf();
        tracing::debug!(path = %path.display(), "temporary audio artifact created");
        Ok(Self { file: Some(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writable handle; provider output is streamed straight into it.
    pub fn writer(&mut self) -> Result<&mut File> {
        match self.file.as_mut() {
            Some(file) => Ok(file.as_file_mut()),
            None => Err(ConversionError::io(
                format!("temporary audio file {} already released", self.path.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )),
        }
    }

    /// Flush buffered bytes so an external process sees the whole stream.
    pub fn flush(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.writer()?
            .flush()
            .map_err(|e| ConversionError::io(format!("cannot flush {}", path.display()), e))
    }

    /// Delete the file now. Equivalent to dropping, but explicit at call sites.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(file) = self.file.take() else { return };
        match file.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "temporary audio artifact removed"),
            Err(e) => tracing::debug!(
                path = %self.path.display(),
                error = %e,
                "could not remove temporary audio artifact"
            ),
        }
    }
}

impl Drop for TemporaryAudioArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = TemporaryAudioArtifact::create(Some(dir.path())).unwrap();
        artifact.writer().unwrap().write_all(b"ID3").unwrap();
        artifact.flush().unwrap();

        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3");

        artifact.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let artifact = TemporaryAudioArtifact::create(Some(dir.path())).unwrap();
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        assert!(matches!(
            TemporaryAudioArtifact::create(Some(&gone)),
            Err(ConversionError::Io { .. })
        ));
    }

    #[test]
    fn test_already_deleted_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = TemporaryAudioArtifact::create(Some(dir.path())).unwrap();
        std::fs::remove_file(artifact.path()).unwrap();
        artifact.release();
    }
}
