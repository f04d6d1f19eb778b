//! Text processing utilities.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_RE: OnceLock<Regex> = OnceLock::new();
static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
static LEADING_ARTICLE_RE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

fn html_tag_re() -> &'static Regex {
    HTML_TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex is valid"))
}

fn non_word_re() -> &'static Regex {
    NON_WORD_RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("static regex is valid"))
}

fn leading_article_re() -> &'static Regex {
    LEADING_ARTICLE_RE.get_or_init(|| Regex::new(r"^(the|a|an)\s+").expect("static regex is valid"))
}

fn numeric_entity_re() -> &'static Regex {
    NUMERIC_ENTITY_RE.get_or_init(|| Regex::new(r"&#(\d{1,7});").expect("static regex is valid"))
}

/// Replace consecutive whitespace (spaces, tabs, newlines) with a single space
/// and trim leading/trailing whitespace.
///
/// Returns an empty string for inputs that are entirely whitespace.
pub fn normalize_whitespace(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    whitespace_re().replace_all(s, " ").trim().to_string()
}

/// Decode the HTML entities that commonly appear in podcast feed descriptions.
///
/// Handles the named entities `&amp; &lt; &gt; &quot; &apos; &nbsp;` plus
/// decimal numeric references (`&#8217;` and friends). `&amp;` is decoded
/// last so `&amp;lt;` yields `&lt;` rather than `<`.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let decoded = numeric_entity_re().replace_all(s, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Clean a text field from a source payload: decode HTML entities, strip tags,
/// collapse whitespace, and trim.
///
/// Total — any input produces a (possibly empty) plain-text string.
pub fn clean_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let decoded = decode_entities(s);
    let stripped = html_tag_re().replace_all(&decoded, " ");
    normalize_whitespace(&stripped)
}

/// Normalize text for duplicate matching: lowercase, drop a leading article
/// (`the`/`a`/`an`), remove punctuation, and collapse whitespace.
///
/// This is a matching aid only — display fields keep their original case and
/// punctuation.
pub fn normalize_for_matching(s: &str) -> String {
    let lowered = s.to_lowercase();
    let no_article = leading_article_re().replace(&lowered, "");
    let no_punct = non_word_re().replace_all(&no_article, "");
    normalize_whitespace(&no_punct)
}

/// Truncate `s` to at most `max_len` characters, breaking at the last word
/// boundary past the halfway point and appending `"..."` if truncation
/// occurred. Counts characters (not bytes), so multi-byte UTF-8 is safe.
pub fn truncate_at_word(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }

    let byte_offset = s
        .char_indices()
        .nth(max_len)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let mut truncated = &s[..byte_offset];

    // Prefer a word boundary unless it would cost more than half the budget.
    if let Some(last_space) = truncated.rfind(' ') {
        if truncated[..last_space].chars().count() > max_len / 2 {
            truncated = &truncated[..last_space];
        }
    }

    format!("{}...", truncated.trim_end_matches(['.', ',', '!', '?', ';', ':', ' ']))
}

/// Char-safe prefix of at most `max_len` characters, used for fingerprint
/// components.
pub fn char_prefix(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
