use std::collections::HashSet;

use ammonia::Builder;
use htmlescape::decode_html;
use once_cell::sync::Lazy;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

/// Longest value forwarded to the provider for a text field; merge fields
/// are capped at 255 characters upstream
const MAX_TEXT_GRAPHEMES: usize = 255;

/// Per-field clean-up applied to submitted values before they leave the
/// server. Which one applies is declared per field in configuration; plain
/// text is the default.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sanitizer {
    /// Strip markup, percent-encoded octets and line breaks, collapse
    /// whitespace, trim
    #[default]
    Text,
    /// Keep only characters legal in an email address. Returns an empty string
    /// when the input cannot be salvaged.
    Email,
    /// Forward the value untouched
    Raw,
}

impl Sanitizer {
    pub fn apply(
        self,
        value: &str,
    ) -> String {
        match self {
            Sanitizer::Text => sanitize_text(value),
            Sanitizer::Email => sanitize_email(value),
            Sanitizer::Raw => value.to_owned(),
        }
    }
}

fn sanitize_text(value: &str) -> String {
    let stripped = strip_tags(value);
    let stripped = strip_octets(&stripped);
    // `split_whitespace` takes care of line breaks, tabs and runs of spaces
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.graphemes(true).count() > MAX_TEXT_GRAPHEMES {
        true => collapsed.graphemes(true).take(MAX_TEXT_GRAPHEMES).collect(),
        false => collapsed,
    }
}

/// No tags at all; `<script>` and `<style>` lose their content too
static PLAIN_TEXT: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::empty();
    builder
        .clean_content_tags(HashSet::from(["script", "style"]))
        .strip_comments(true);
    builder
});

/// Drop markup, keeping only the text. The value is plain text from here on,
/// so the entities `ammonia` escapes with are decoded again.
fn strip_tags(value: &str) -> String {
    let cleaned = PLAIN_TEXT.clean(value).to_string();
    decode_html(&cleaned).unwrap_or(cleaned)
}

/// Remove `%XX` sequences, repeatedly, so that `%2%41` cannot reassemble into
/// an octet
fn strip_octets(value: &str) -> String {
    let mut current = value.to_owned();
    loop {
        let bytes = current.as_bytes();
        let mut out = String::with_capacity(current.len());
        let mut i = 0;
        let mut found = false;
        while i < bytes.len() {
            if bytes[i] == b'%'
                && i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit()
            {
                i += 3;
                found = true;
                continue;
            }
            // `%` and hex digits are ascii, so any other byte boundary we stop at
            // is a char boundary
            let ch = current[i..].chars().next().unwrap_or_default();
            out.push(ch);
            i += ch.len_utf8().max(1);
        }
        if !found {
            return out;
        }
        current = out;
    }
}

const LOCAL_PART_SYMBOLS: &str = "!#$%&'*+/=?^_`{|}~.-";

fn sanitize_email(value: &str) -> String {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return String::new();
    };

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(*c))
        .collect();
    if local.is_empty() {
        return String::new();
    }

    // each label keeps letters, digits and inner hyphens; empty labels (from
    // `..` or leading/trailing dots) disappear
    let labels: Vec<String> = domain
        .split('.')
        .map(|label| {
            label
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .trim_matches('-')
                .to_owned()
        })
        .filter(|label| !label.is_empty())
        .collect();
    if labels.len() < 2 {
        return String::new();
    }

    format!("{local}@{}", labels.join("."))
}
