//! The immutable input of one conversion.

use std::path::{Path, PathBuf};

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "pt-br";

/// What to say, where to put it, and how the provider should say it.
///
/// Built once per invocation and never mutated afterwards. The text and
/// language are passed through untouched; judging them is the provider's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    text: String,
    output_path: PathBuf,
    language: String,
    slow: bool,
}

impl ConversionRequest {
    /// Request with the default language and normal speed.
    pub fn new(text: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            output_path: output_path.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            slow: false,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn slow(&self) -> bool {
        self.slow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = ConversionRequest::new("Olá mundo", "/tmp/out.wav");
        assert_eq!(req.language(), "pt-br");
        assert!(!req.slow());
        assert_eq!(req.output_path(), Path::new("/tmp/out.wav"));
    }

    #[test]
    fn test_builders() {
        let req = ConversionRequest::new("hi", "a.wav").with_language("en").with_slow(true);
        assert_eq!(req.language(), "en");
        assert!(req.slow());
        assert_eq!(req.text(), "hi");
    }
}
