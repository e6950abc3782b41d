//! Text escaping and dangerous-pattern detection.
//!
//! Every piece of user text passes through here before it enters the model
//! or storage. [`sanitize`] escapes in a single pass, so an ampersand that
//! is part of an already-produced entity is never visited twice; the escape
//! set and its ampersand-first ordering match the persisted format.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Escape the HTML-significant characters `& < > " ' / `` ` ``.
///
/// Single-pass, ampersand handled first by construction: input ampersands
/// are escaped exactly once and output entities are never re-escaped.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            _ => out.push(c),
        }
    }
    out
}

fn dangerous_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)<\s*script",
            r"(?i)<\s*/\s*script",
            r"(?i)<\s*iframe",
            r"(?i)javascript\s*:",
            r"(?i)\bon\w+\s*=",
            r"(?i)\beval\s*\(",
            r"(?i)document\s*\.\s*cookie",
            r"(?i)\blocalstorage\b",
            r"(?i)\bsessionstorage\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("signature pattern should compile"))
        .collect()
    })
}

/// True if the text matches any known injection signature: script or iframe
/// tags, the `javascript:` scheme, inline event-handler attributes,
/// `eval(`, or cookie/storage API references.
pub fn detect_dangerous(text: &str) -> bool {
    dangerous_patterns().iter().any(|p| p.is_match(text))
}

/// True if the text contains none of the characters [`sanitize`] escapes
/// (bare ampersands excepted, since entities legitimately contain them).
pub fn is_sanitized(text: &str) -> bool {
    !text
        .chars()
        .any(|c| matches!(c, '<' | '>' | '"' | '\'' | '/' | '`'))
}

/// Sanitize text of unknown provenance without double-escaping text that is
/// already clean. Used at the cross-process boundary, where payloads are
/// treated as untrusted input.
pub fn resanitize(text: &str) -> Cow<'_, str> {
    if is_sanitized(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(sanitize(text))
    }
}
