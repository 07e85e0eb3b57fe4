//! Text chunker for the Google Translate TTS endpoint.
//!
//! The endpoint refuses anything longer than [`MAX_CHARS`] characters per
//! request, so the input is cut into speakable pieces first:
//!
//! 1. **Pre-process** — space after tone marks, join hyphenated line breaks,
//!    drop the period after common abbreviations (`Dr.` → `Dr`).
//! 2. **Split** (only when the text is too long) — after tone marks, on
//!    `. ` / `, ` (except after `e.g.`-style abbreviations), on colons not
//!    between digits, and on every other sentence-level punctuation mark.
//! 3. **Clean** — strip, and drop pieces that are only punctuation/whitespace.
//! 4. **Minimise** — any piece still over the limit is cut at the last space
//!    before it (or hard-cut when there is no space).
//!
//! Lengths are counted in characters, not bytes.

use fancy_regex::Regex as FancyRegex;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum characters the endpoint accepts in one request.
pub const MAX_CHARS: usize = 100;

/// Marks that change intonation; the split happens *after* them so they stay
/// attached to their sentence.
const TONE_MARKS: &str = "?!？！";

/// Non-ASCII punctuation treated as sentence-level by the splitter.
const EXTRA_PUNCTUATION: &str = "¡¿…‥،—。，、：？！";

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

static RE_TONE_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?!？！]").unwrap());

static RE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(dr|jr|mr|mrs|ms|msgr|prof|sr|st)\.").unwrap()
});

/// Split points. Alternatives, in order: after a tone mark (zero-width);
/// `. `/`, ` not preceded by `.x`; a colon not between digits; any other
/// sentence-level mark.
static RE_SPLIT: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(
        r"(?i)(?<=[?!？！])|(?<!\.[a-z])[.,] |(?<!\d):(?!\d)|[¡()\[\]¿…‥،;—。，、\n]",
    )
    .unwrap()
});

// ─────────────────────────────────────────────────────────────────────────────
// Stages
// ─────────────────────────────────────────────────────────────────────────────

fn preprocess(text: &str) -> String {
    let spaced = RE_TONE_MARK.replace_all(text, "$0 ");
    let joined = spaced.replace("-\n", "");
    RE_ABBREVIATION.replace_all(&joined, "$1").into_owned()
}

/// Split `text` at every match of `re`, dropping the matched separators.
///
/// A pathological input that trips the backtracking limit is kept as a single
/// remaining piece; [`minimize`] still bounds its length afterwards.
fn split_on<'t>(re: &FancyRegex, text: &'t str) -> Vec<&'t str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for found in re.find_iter(text) {
        let Ok(m) = found else { break };
        pieces.push(&text[last..m.start()]);
        last = m.end();
    }
    pieces.push(&text[last..]);
    pieces
}

fn is_filler(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || TONE_MARKS.contains(c)
        || EXTRA_PUNCTUATION.contains(c)
}

fn clean<'a>(pieces: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.chars().all(is_filler))
        .map(str::to_string)
        .collect()
}

/// Cut `text` into pieces of at most `max` characters, preferring to break
/// on the last space before the limit.
fn minimize(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.chars().count() <= max {
            out.push(rest.to_string());
            return out;
        }
        // Byte offset of the first character past the limit.
        let limit = rest
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = rest[..limit]
            .rfind(' ')
            .filter(|&i| i > 0)
            .unwrap_or(limit);
        out.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Turn free text into request-sized chunks.
///
/// Returns an empty vector when there is nothing speakable (empty input, or
/// only punctuation/whitespace).
pub fn tokenize(text: &str) -> Vec<String> {
    let text = preprocess(text.trim());

    if text.chars().count() <= MAX_CHARS {
        return clean([text.as_str()]);
    }

    let minimized: Vec<String> = clean(split_on(&RE_SPLIT, &text))
        .iter()
        .flat_map(|piece| minimize(piece, MAX_CHARS))
        .collect();
    // A cut can leave a tail that is only punctuation or starts with spaces.
    clean(minimized.iter().map(String::as_str))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
