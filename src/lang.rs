//! Language-code normalisation for the Google Translate voice.
//!
//! The endpoint dropped most regional variants years ago; sending `pt-br`
//! verbatim gets no audio back. Deprecated regional codes are folded onto the
//! base language they now resolve to. Everything else passes through — the
//! provider is the judge of what it supports.

/// `(base language, deprecated codes that fall back to it)`.
const DEPRECATED: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "en-us", "en-ca", "en-uk", "en-gb", "en-au", "en-gh", "en-in", "en-ie", "en-nz",
            "en-ng", "en-ph", "en-za", "en-tz",
        ],
    ),
    ("fr", &["fr-ca", "fr-fr"]),
    ("pt", &["pt-br", "pt-pt"]),
    ("es", &["es-es", "es-us"]),
    ("zh-CN", &["zh-cn"]),
    ("zh-TW", &["zh-tw"]),
];

/// Normalise a user-supplied language code.
///
/// Trims, lower-cases, and maps deprecated regional codes onto their
/// replacement. Unknown codes are returned lower-cased and otherwise intact.
pub fn normalize_language(code: &str) -> String {
    let lowered = code.trim().to_lowercase();
    for &(base, aliases) in DEPRECATED {
        if aliases.contains(&lowered.as_str()) {
            tracing::debug!(from = %lowered, to = base, "language code falls back to base language");
            return base.to_string();
        }
    }
    lowered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portuguese_fallback() {
        assert_eq!(normalize_language("pt-br"), "pt");
        assert_eq!(normalize_language("PT-BR"), "pt");
        assert_eq!(normalize_language(" pt-pt "), "pt");
    }

    #[test]
    fn test_chinese_keeps_region_case() {
        assert_eq!(normalize_language("zh-cn"), "zh-CN");
        assert_eq!(normalize_language("ZH-TW"), "zh-TW");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_language("de"), "de");
        assert_eq!(normalize_language("Ja"), "ja");
        assert_eq!(normalize_language("xx-yy"), "xx-yy");
        assert_eq!(normalize_language(""), "");
    }
}
