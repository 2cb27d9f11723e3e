//! Minimal tag and attribute scanning for the portal's server-rendered pages.
//!
//! Only what the login and lock-list pages need: locate start tags by name,
//! read their attributes, and match class tokens.

use regex::Regex;
use std::sync::LazyLock;

static START_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("START_TAG_RE should compile")
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("ATTR_RE should compile")
});

const TOKEN_FIELD: &str = "authenticity_token";
const PASSWORD_FIELD: &str = "user[password]";

/// A start tag and its attributes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name.
    pub name: String,
    /// Byte offset of the `<` in the scanned document.
    pub start: usize,
    /// Byte offset just past the closing `>`.
    pub end: usize,
    attributes: Vec<(String, String)>,
}

impl StartTag {
    /// Value of attribute `name` (case-insensitive), entity-decoded.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when the `class` attribute contains `class` as a whole token.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|value| value.split_ascii_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }
}

/// All start tags named `name` in `html`, in document order.
pub fn start_tags<'a>(html: &'a str, name: &'a str) -> impl Iterator<Item = StartTag> + 'a {
    START_TAG_RE.captures_iter(html).filter_map(move |caps| {
        let whole = caps.get(0)?;
        let tag_name = caps.get(1)?.as_str();
        if !tag_name.eq_ignore_ascii_case(name) {
            return None;
        }
        let raw_attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some(StartTag {
            name: tag_name.to_ascii_lowercase(),
            start: whole.start(),
            end: whole.end(),
            attributes: parse_attributes(raw_attrs),
        })
    })
}

/// Value of the hidden `authenticity_token` input, if present and non-empty.
pub fn extract_authenticity_token(html: &str) -> Option<String> {
    start_tags(html, "input")
        .find(|tag| tag.attr("name") == Some(TOKEN_FIELD))
        .and_then(|tag| tag.attr("value").map(str::to_string))
        .filter(|value| !value.is_empty())
}

/// True when the page still renders the sign-in password field.
pub fn has_sign_in_form(html: &str) -> bool {
    start_tags(html, "input").any(|tag| tag.attr("name") == Some(PASSWORD_FIELD))
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            Some((key, decode_entities(value)))
        })
        .collect()
}

/// Decode the handful of entities the portal's templates escape in attribute values.
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&#43;", "+")
        .replace("&#61;", "=")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
