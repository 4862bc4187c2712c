//! Classification of user-supplied page and database references.
//!
//! Every command that targets a page accepts one free-form argument which may be:
//! - a raw identifier (32 hex digits, hyphens optional, any case)
//! - a Notion URL carrying the identifier somewhere in its path or query
//! - a page title, resolved later through search (see [`crate::resolve`])

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

static HEX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-fA-F]{32}").expect("Invalid regex pattern"));

static HYPHENATED_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("Invalid regex pattern")
});

/// What kind of reference the user typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    /// A bare identifier
    Id,
    /// An http(s) URL
    Url,
    /// Anything else, treated as a title to search for
    Name,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Id => write!(f, "id"),
            RefKind::Url => write!(f, "url"),
            RefKind::Name => write!(f, "name"),
        }
    }
}

/// A classified reference.
///
/// `id` is present exactly when `kind` is [`RefKind::Id`], and is always the
/// lowercase hyphenated form. A URL without an extractable identifier keeps
/// `kind == Url` and no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    kind: RefKind,
    raw: String,
    id: Option<String>,
}

impl PageRef {
    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// The input exactly as the user typed it (minus surrounding whitespace)
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Classify a reference string.
///
/// # Example
///
/// ```text
/// classify("https://www.notion.so/Team-Wiki-1a2b...") -> Id
/// classify("1A2B3C4D-...")                            -> Id
/// classify("Team Wiki")                               -> Name
/// ```
pub fn classify(input: &str) -> PageRef {
    let raw = input.trim().to_string();

    if raw.starts_with("http://") || raw.starts_with("https://") {
        let id = extract_uuid(&raw);
        let kind = if id.is_some() {
            RefKind::Id
        } else {
            RefKind::Url
        };
        return PageRef { kind, raw, id };
    }

    if looks_like_id(&raw) {
        let id = format_uuid(&strip_hyphens(&raw));
        return PageRef {
            kind: RefKind::Id,
            raw,
            id,
        };
    }

    PageRef {
        kind: RefKind::Name,
        raw,
        id: None,
    }
}

/// True if the input is 32 hex digits once hyphens are removed.
pub fn looks_like_id(s: &str) -> bool {
    let cleaned = strip_hyphens(s);
    cleaned.len() == 32 && cleaned.chars().all(|c| c.is_ascii_hexdigit())
}

/// Pull a canonical identifier out of arbitrary text, usually a URL.
///
/// The whole string with hyphens removed wins if it is an identifier.
/// Otherwise the leftmost bare 32-hex-digit run or hyphenated 8-4-4-4-12
/// group is used.
pub fn extract_uuid(s: &str) -> Option<String> {
    if looks_like_id(s) {
        return format_uuid(&strip_hyphens(s));
    }

    let found = match (HEX_RUN.find(s), HYPHENATED_UUID.find(s)) {
        (Some(bare), Some(hyphenated)) if hyphenated.start() < bare.start() => Some(hyphenated),
        (Some(bare), _) => Some(bare),
        (None, hyphenated) => hyphenated,
    }?;

    format_uuid(&strip_hyphens(found.as_str()))
}

/// Lowercase and group 32 hex digits as 8-4-4-4-12.
pub fn format_uuid(hex: &str) -> Option<String> {
    Uuid::try_parse(hex)
        .ok()
        .map(|u| u.hyphenated().to_string())
}

/// Compact form used in tables: the first 8 hex digits.
pub fn short_id(id: &str) -> String {
    strip_hyphens(id).chars().take(8).collect()
}

fn strip_hyphens(s: &str) -> String {
    s.chars().filter(|&c| c != '-').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "308b8dbc-2c89-80da-9070-000be5b57575";

    #[test]
    fn test_identifier_forms_classify_identically() {
        let variants = [
            "308b8dbc2c8980da9070000be5b57575",
            "308B8DBC2C8980DA9070000BE5B57575",
            "308b8dbc-2c89-80da-9070-000be5b57575",
            "308B8DBC-2C89-80DA-9070-000BE5B57575",
            "308b-8dbc2c89-80da9070000be5b57-575",
            "  308b8dbc2c8980da9070000be5b57575  ",
        ];

        for input in variants {
            let r = classify(input);
            assert_eq!(r.kind(), RefKind::Id, "input: {input}");
            assert_eq!(r.id(), Some(CANONICAL), "input: {input}");
        }
    }

    #[test]
    fn test_names_classify_as_name() {
        for input in [
            "Meeting Notes",
            "deadbeef",
            "308b8dbc2c8980da9070000be5b5757",
            "308b8dbc2c8980da9070000be5b575755",
            "g08b8dbc2c8980da9070000be5b57575",
            "notion.so/page",
            "",
        ] {
            let r = classify(input);
            assert_eq!(r.kind(), RefKind::Name, "input: {input}");
            assert!(r.id().is_none());
        }
    }

    #[test]
    fn test_url_with_slug() {
        let r = classify("https://www.notion.so/myteam/Roadmap-308b8dbc2c8980da9070000be5b57575");
        assert_eq!(r.kind(), RefKind::Id);
        assert_eq!(r.id(), Some(CANONICAL));
    }

    #[test]
    fn test_url_with_hyphenated_id_and_view() {
        let r = classify(
            "https://www.notion.so/308b8dbc-2c89-80da-9070-000be5b57575?v=aaaabbbbccccddddeeeeffff00001111",
        );
        assert_eq!(r.id(), Some(CANONICAL));
    }

    #[test]
    fn test_url_without_id() {
        let r = classify("https://www.notion.so/myteam/Roadmap");
        assert_eq!(r.kind(), RefKind::Url);
        assert!(r.id().is_none());
        assert_eq!(r.raw(), "https://www.notion.so/myteam/Roadmap");
    }

    #[test]
    fn test_extract_uuid_from_text() {
        assert_eq!(
            extract_uuid("see collection://308b8dbc-2c89-80da-9070-000be5b57575 here"),
            Some(CANONICAL.to_string())
        );
        assert_eq!(extract_uuid("nothing here"), None);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(CANONICAL), "308b8dbc");
        assert_eq!(short_id("abc"), "abc");
    }
}
