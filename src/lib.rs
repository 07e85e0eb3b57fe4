//! # tts2wav
//!
//! Text → speech → 16 kHz mono 16-bit PCM WAV, ready for telephony or
//! speech-recognition pipelines.
//!
//! ## Quick start
//!
//! ```no_run
//! use tts2wav::{ConversionRequest, Settings, TextToAudioConverter};
//!
//! let converter = TextToAudioConverter::from_settings(&Settings::default()).unwrap();
//! let request = ConversionRequest::new("Olá mundo", "ola.wav").with_language("pt-br");
//! converter.convert(&request).unwrap();
//! ```
//!
//! ## Pipeline
//! 1. **Chunking** — text split into ≤ 100-char pieces on sentence and
//!    clause boundaries ([`tokenize`]).
//! 2. **Synthesis** — each piece is spoken by Google Translate's TTS voice;
//!    the MP3 frames are streamed into a scoped temporary file ([`temp`]).
//! 3. **Transcoding** — ffmpeg, or symphonia + rubato in-process, turns the
//!    MP3 into the fixed output format ([`transcode`]).
//! 4. **Verification** — the WAV header is read back and checked ([`wav`]).
//!
//! ## Transcoder backends
//! | Backend   | Requirement                                                     |
//! |-----------|-----------------------------------------------------------------|
//! | `ffmpeg`  | an ffmpeg executable (override, vendored copy, system, `PATH`)  |
//! | `library` | the `library` cargo feature (on by default)                     |

pub mod config;
pub mod converter;
pub mod error;
pub mod lang;
pub mod provider;
pub mod request;
pub mod temp;
pub mod tokenize;
pub mod transcode;
pub mod wav;

pub use config::Settings;
pub use converter::{Stage, TextToAudioConverter};
pub use error::{ConversionError, Result};
pub use provider::{GoogleTranslateTts, SpeechProvider};
pub use request::ConversionRequest;
pub use transcode::{AudioTranscoder, TranscoderBackend};
