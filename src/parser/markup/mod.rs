//! Notion markup to Markdown.
//!
//! Page bodies come back from `notion-fetch` as markdown interleaved with
//! custom tags (`<callout>`, `<columns>`, `<mention-page>` and friends).
//! [`notion_to_markdown`] turns that into plain Markdown for the terminal.

pub mod render;
pub mod tree;

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

pub use render::{clean_text, clean_url, dedent, Renderer};
pub use tree::{Element, Node, TreeError};

static PLACEHOLDER_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<empty-block\s*/?>|<unknown\b[^<>]*/?>|<omitted\s*/?>")
        .expect("Invalid regex pattern")
});

static WHITESPACE_ONLY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").expect("Invalid regex pattern"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid regex pattern"));

/// Render Notion markup as Markdown.
///
/// Never fails: markup that cannot be turned into a tree is returned as-is.
pub fn notion_to_markdown(markup: &str) -> String {
    let cleaned = PLACEHOLDER_TAGS.replace_all(markup, "");

    let nodes = match tree::parse(&cleaned) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!("Falling back to raw page content: {e}");
            return markup.to_string();
        }
    };

    let rendered = Renderer::new().render(&nodes);
    let rendered = WHITESPACE_ONLY_LINE.replace_all(&rendered, "");
    EXCESS_NEWLINES
        .replace_all(&rendered, "\n\n")
        .trim()
        .to_string()
}
