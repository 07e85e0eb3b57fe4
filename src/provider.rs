//! Speech providers — text in, compressed audio out.
//!
//! [`GoogleTranslateTts`] talks to the same undocumented Google Translate
//! endpoint the `gTTS` Python package uses:
//!
//! | Step      | Detail                                                         |
//! |-----------|----------------------------------------------------------------|
//! | Chunking  | [`tokenize`](crate::tokenize::tokenize), ≤ 100 chars per call  |
//! | Request   | `POST /_/TranslateWebserverUi/data/batchexecute`, form `f.req` |
//! | Response  | line-oriented; the `jQ1olc` line carries base64 MP3            |
//! | Output    | MP3 frames of every chunk, concatenated in order               |

use std::io::Write;
use std::time::Duration;

use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::{ConversionError, Result};
use crate::lang::normalize_language;
use crate::tokenize::tokenize;

/// RPC id of the text-to-speech call inside `batchexecute`.
const TTS_RPC_ID: &str = "jQ1olc";

const REFERER: &str = "http://translate.google.com/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

/// Default top-level domain of the Google Translate host.
pub const DEFAULT_TLD: &str = "com";

/// Captures the base64 payload of an RPC response line.
static RE_AUDIO: Lazy<Regex> = Lazy::new(|| Regex::new(r#"jQ1olc","\[\\"(.*)\\"]"#).unwrap());

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A remote (or local) text-to-speech engine.
pub trait SpeechProvider {
    /// Short name used in logs and progress output.
    fn name(&self) -> &str;

    /// Synthesise `text` and stream the encoded audio into `sink`.
    ///
    /// Returns the number of bytes written.
    fn synthesize(&self, text: &str, language: &str, slow: bool, sink: &mut dyn Write)
        -> Result<u64>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Google Translate TTS
// ─────────────────────────────────────────────────────────────────────────────

/// Keyless Google Translate voice.
pub struct GoogleTranslateTts {
    agent: ureq::Agent,
    tld: String,
}

impl GoogleTranslateTts {
    /// Provider for `translate.google.<tld>`; `timeout` bounds each request
    /// end-to-end when set, otherwise the HTTP client's defaults apply.
    pub fn new(tld: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut config = ureq::Agent::config_builder();
        if timeout.is_some() {
            config = config.timeout_global(timeout);
        }
        Self { agent: config.build().into(), tld: tld.into() }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://translate.google.{}/_/TranslateWebserverUi/data/batchexecute",
            self.tld
        )
    }

    /// One round-trip for one chunk; returns the raw response body.
    fn request_chunk(&self, chunk: &str, lang: &str, slow: bool) -> Result<String> {
        let payload = package_rpc(chunk, lang, slow);
        let mut response = self
            .agent
            .post(&self.endpoint())
            .header("Referer", REFERER)
            .header("User-Agent", USER_AGENT)
            .send_form([("f.req", payload.as_str())])
            .map_err(|e| self.classify(e, lang))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.classify(e, lang))
    }

    fn classify(&self, err: ureq::Error, lang: &str) -> ConversionError {
        match err {
            ureq::Error::StatusCode(status) => ConversionError::ProviderRejected(format!(
                "HTTP {} from {}: {}",
                status,
                self.endpoint(),
                infer_cause(status, &self.tld, lang)
            )),
            other => ConversionError::ProviderUnreachable(Box::new(other)),
        }
    }
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new(DEFAULT_TLD, None)
    }
}

impl SpeechProvider for GoogleTranslateTts {
    fn name(&self) -> &str {
        "google-translate"
    }

    fn synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
        sink: &mut dyn Write,
    ) -> Result<u64> {
        let chunks = tokenize(text);
        if chunks.is_empty() {
            return Err(ConversionError::ProviderRejected("no text to speak".to_string()));
        }
        let lang = normalize_language(language);

        let mut written = 0u64;
        for (idx, chunk) in chunks.iter().enumerate() {
            tracing::debug!(
                part = idx + 1,
                total = chunks.len(),
                chars = chunk.chars().count(),
                lang = %lang,
                slow,
                "requesting speech chunk"
            );
            let body = self.request_chunk(chunk, &lang, slow)?;
            let audio = extract_audio(&body, &lang)?;
            sink.write_all(&audio)
                .map_err(|e| ConversionError::io("cannot write synthesized audio", e))?;
            written += audio.len() as u64;
        }

        tracing::info!(chunks = chunks.len(), bytes = written, provider = self.name(), "speech synthesized");
        Ok(written)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build the `f.req` form value for one chunk.
///
/// The inner parameter list is JSON-encoded *into a string* which is then
/// embedded in the outer RPC envelope — the endpoint expects double encoding.
fn package_rpc(text: &str, lang: &str, slow: bool) -> String {
    let speed = if slow { Value::Bool(true) } else { Value::Null };
    let parameter = json!([text, lang, speed, "null"]).to_string();
    json!([[[TTS_RPC_ID, parameter, Value::Null, "generic"]]]).to_string()
}

/// Pull the MP3 bytes out of a `batchexecute` response body.
fn extract_audio(body: &str, lang: &str) -> Result<Vec<u8>> {
    let mut audio = Vec::new();
    let mut saw_rpc = false;

    for line in body.lines().filter(|l| l.contains(TTS_RPC_ID)) {
        saw_rpc = true;
        let payload = RE_AUDIO
            .captures(line)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                ConversionError::ProviderRejected(format!(
                    "no audio stream in response; unsupported language '{}'?",
                    lang
                ))
            })?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload.as_str())
            .map_err(|e| {
                ConversionError::ProviderRejected(format!("malformed audio payload: {}", e))
            })?;
        audio.extend_from_slice(&decoded);
    }

    if !saw_rpc {
        return Err(ConversionError::ProviderRejected(
            "response carried no speech RPC result".to_string(),
        ));
    }
    Ok(audio)
}

/// Best guess at why the endpoint answered with an error status.
fn infer_cause(status: u16, tld: &str, lang: &str) -> String {
    match status {
        403 => "bad token or upstream API changes".to_string(),
        404 if tld != DEFAULT_TLD => format!("unsupported tld '{}'", tld),
        400 => format!("request refused; unsupported language '{}'?", lang),
        s if s >= 500 => "upstream API error, try again later".to_string(),
        _ => "unknown".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_rpc_normal_speed() {
        let rpc = package_rpc("Olá mundo", "pt", false);
        assert_eq!(
            rpc,
            r#"[[["jQ1olc","[\"Olá mundo\",\"pt\",null,\"null\"]",null,"generic"]]]"#
        );
    }

    #[test]
    fn test_package_rpc_slow() {
        let rpc = package_rpc("hi", "en", true);
        let outer: Value = serde_json::from_str(&rpc).unwrap();
        let inner: Value = serde_json::from_str(outer[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(inner, json!(["hi", "en", true, "null"]));
    }

    #[test]
    fn test_extract_audio() {
        let body = concat!(
            ")]}'\n",
            "\n",
            "104\n",
            r#"[["wrb.fr","jQ1olc","[\"SUQzBAAAAAAA\"]",null,null,null,"generic"],["di",54]]"#,
            "\n",
            "25\n",
            r#"[["e",4,null,null,160]]"#,
            "\n",
        );
        let audio = extract_audio(body, "pt").unwrap();
        assert_eq!(&audio[..3], b"ID3");
        assert_eq!(audio.len(), 9);
    }

    #[test]
    fn test_extract_audio_rejected_language() {
        let body = concat!(
            ")]}'\n",
            r#"[["wrb.fr","jQ1olc",null,null,null,[3],"generic"]]"#,
            "\n",
        );
        let err = extract_audio(body, "xx").unwrap_err();
        assert!(matches!(err, ConversionError::ProviderRejected(ref m) if m.contains("'xx'")));
    }

    #[test]
    fn test_extract_audio_without_rpc_line() {
        assert!(matches!(
            extract_audio(")]}'\n[[\"e\",4]]\n", "pt"),
            Err(ConversionError::ProviderRejected(_))
        ));
    }

    #[test]
    fn test_empty_text_rejected_without_network() {
        // An unroutable tld: if a request were attempted this would be a
        // ProviderUnreachable error instead.
        let provider = GoogleTranslateTts::new("invalid", Some(Duration::from_millis(1)));
        let mut sink = Vec::new();
        let err = provider.synthesize("  !  ", "pt-br", false, &mut sink).unwrap_err();
        assert!(matches!(err, ConversionError::ProviderRejected(ref m) if m == "no text to speak"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_infer_cause() {
        assert!(infer_cause(403, "com", "pt").contains("token"));
        assert!(infer_cause(404, "com.br", "pt").contains("com.br"));
        assert_eq!(infer_cause(404, "com", "pt"), "unknown");
        assert!(infer_cause(503, "com", "pt").contains("upstream"));
    }

    #[test]
    fn test_endpoint_uses_tld() {
        let provider = GoogleTranslateTts::new("com.br", None);
        assert_eq!(
            provider.endpoint(),
            "https://translate.google.com.br/_/TranslateWebserverUi/data/batchexecute"
        );
    }
}
