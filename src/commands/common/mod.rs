//! Common utility functions shared across command implementations.
//!
//! This module provides utilities for:
//! - Connecting to the MCP server
//! - Resolving page and database references
//! - Deriving titles and icons from markdown files
//! - Reading entry bodies from flags or files

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::mcp::{NotionClient, Parent, SearchResult};
use crate::parser::frontmatter;
use crate::resolve::{resolve_database_id, resolve_page_id};

const NOTION_BASE_URL: &str = "https://www.notion.so/";

/// Page or database summary used for list and create output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<String>,
}

impl From<&SearchResult> for Summary {
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.id.clone(),
            title: result.title.clone(),
            url: result.url.clone(),
            icon: None,
            last_edited: result.timestamp.clone(),
        }
    }
}

pub fn connect(config: &Config) -> Result<NotionClient> {
    NotionClient::connect(config)
}

pub fn resolve_page(client: &mut NotionClient, input: &str) -> Result<String> {
    Ok(resolve_page_id(input, client)?)
}

pub fn resolve_database(client: &mut NotionClient, input: &str) -> Result<String> {
    Ok(resolve_database_id(input, client)?)
}

/// Resolve an optional `--parent` page
pub fn resolve_parent(client: &mut NotionClient, parent: Option<&str>) -> Result<Option<Parent>> {
    parent
        .map(|p| resolve_page(client, p).map(Parent::Page))
        .transpose()
}

/// Search queries treat an empty string as "everything"
pub fn list_query(query: Option<String>) -> String {
    query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| "*".to_string())
}

/// A limit of zero means no limit
pub fn limit_or_all(limit: usize) -> usize {
    if limit == 0 {
        usize::MAX
    } else {
        limit
    }
}

/// Web URL for a page ID
pub fn page_url(id: &str) -> String {
    format!("{NOTION_BASE_URL}{}", id.replace('-', ""))
}

/// Text of the first `# ` heading
pub fn title_from_markdown(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Title for an uploaded file: the explicit title, the first heading, or the
/// file name without extension.
pub fn upload_title(explicit: Option<String>, body: &str, path: &Path) -> String {
    explicit
        .filter(|t| !t.trim().is_empty())
        .or_else(|| title_from_markdown(body))
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Untitled".to_string())
        })
}

/// Symbol-like non-ASCII character, as used for page icons
pub fn is_emoji(c: char) -> bool {
    (c as u32) > 127 && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_ascii_punctuation()
}

/// Split a leading emoji off a title: `"🚀 Launch"` becomes
/// `(Some("🚀"), "Launch")`. Variation selectors and joiners stay with the
/// icon. Titles that are only an emoji are left alone.
pub fn split_icon(title: &str) -> (Option<String>, String) {
    let icon_len: usize = title
        .chars()
        .take_while(|&c| is_emoji(c))
        .map(char::len_utf8)
        .sum();
    if icon_len == 0 {
        return (None, title.to_string());
    }

    let rest = title[icon_len..].trim();
    if rest.is_empty() {
        return (None, title.to_string());
    }
    (Some(title[..icon_len].to_string()), rest.to_string())
}

/// Body text from `--content` or `--file`. Frontmatter in files is dropped.
pub fn read_body(content: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        return Ok(frontmatter::strip(&text));
    }
    Ok(content.unwrap_or_default())
}
