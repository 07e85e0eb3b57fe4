//! Error taxonomy for a single conversion.
//!
//! Every failure the converter can hit ends up as a [`ConversionError`]. The
//! binary renders it (with its source chain) after an `ERRO:` prefix and exits
//! with status 1; callers never branch on the variant for recovery, only the
//! message differs.

use std::io;

use thiserror::Error;

/// Why a conversion failed.
///
/// Display strings never repeat the wrapped source error — print with
/// `{:#}` through `anyhow` (or walk [`std::error::Error::source`]) to get the
/// full chain.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Transport-level failure talking to the TTS provider (DNS, TLS, reset…).
    #[error("TTS provider unreachable")]
    ProviderUnreachable(#[source] Box<ureq::Error>),

    /// The provider answered but refused the request or sent no audio.
    #[error("TTS provider rejected the request: {0}")]
    ProviderRejected(String),

    /// Synthesis finished without producing a single byte of audio.
    #[error("TTS provider returned no audio")]
    EmptyAudio,

    /// No transcoding engine could be located or spawned.
    #[error("audio transcoder not found: {0}")]
    TranscoderNotFound(String),

    /// The transcoding engine ran but did not produce a valid WAV.
    #[error("audio transcoding failed: {0}")]
    TranscodeFailed(String),

    /// Filesystem failure (temp file, output file, process I/O).
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Invalid or unsatisfiable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConversionError {
    /// Wrap an [`io::Error`] with a human-readable description of the operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_keeps_source() {
        let err = ConversionError::io(
            "cannot create /nope/out.wav",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot create /nope/out.wav");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("denied"));
    }

    #[test]
    fn test_display_does_not_repeat_source() {
        let err = anyhow::Error::from(ConversionError::io(
            "cannot write temporary audio",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        ));
        assert_eq!(format!("{:#}", err), "cannot write temporary audio: disk full");
    }
}
