//! Taxonomy term model and alias derivation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Vocabulary used for article tags.
pub const TAGS_VOCABULARY: &str = "tags";

static INVALID_CSS_CHARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\x{002D}\x{0030}-\x{0039}\x{0041}-\x{005A}\x{005F}\x{0061}-\x{007A}\x{00A1}-\x{FFFF}]")
        .expect("valid css identifier regex")
});
static LEADING_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]").expect("valid leading digit regex"));
static LEADING_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-[0-9])|^(--)").expect("valid leading hyphen regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    /// Vocabulary id.
    pub vid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_alias: Option<String>,
}

impl Term {
    /// Creates a term whose alias is `/<vocabulary>/<name>` in css-class form.
    pub fn new(name: impl Into<String>, vid: impl Into<String>) -> Self {
        let name = name.into();
        let vid = vid.into();
        let path_alias = Some(format!("/{}/{}", css_class(&vid), css_class(&name)));
        Self {
            name,
            vid,
            path_alias,
        }
    }
}

/// Lowercases and sanitizes a value into a valid CSS class name.
///
/// Spaces, underscores, slashes and `[` become hyphens, `]` is dropped, any
/// character outside the CSS identifier range is removed, and identifiers
/// may not start with a digit, `--` or a hyphen followed by a digit. Double
/// underscores survive untouched.
pub fn css_class(value: &str) -> String {
    let lowered = value.to_lowercase();
    let replaced = lowered
        .split("__")
        .map(|segment| {
            segment
                .chars()
                .filter_map(|ch| match ch {
                    ' ' | '_' | '/' | '[' => Some('-'),
                    ']' => None,
                    other => Some(other),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("__");

    let cleaned = INVALID_CSS_CHARS_RE.replace_all(&replaced, "");
    let cleaned = LEADING_DIGIT_RE.replace(&cleaned, "_");
    LEADING_HYPHEN_RE.replace(&cleaned, "__").into_owned()
}
