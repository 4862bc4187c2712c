//! Frontmatter codec for local markdown files synced to Notion.
//!
//! The block is a deliberately small subset of YAML:
//!
//! ```text
//! ---
//! title: Roadmap
//! notion-id: 308b8dbc-2c89-80da-9070-000be5b57575
//! parent:
//!   notion-id: not-managed
//! ---
//!
//! # Body starts here
//! ```
//!
//! Only unindented `key: value` lines are read. Indented lines, comments and
//! blank lines are carried through untouched when the block is rewritten.

const DELIMITER: &str = "---";

/// Key holding the remote page identifier
pub const NOTION_ID_KEY: &str = "notion-id";

/// Top-level metadata read from a frontmatter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub notion_id: Option<String>,
    fields: Vec<(String, String)>,
}

impl Frontmatter {
    /// Top-level keys other than `notion-id`, in file order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.notion_id.is_none() && self.fields.is_empty()
    }
}

/// Split content into its frontmatter and body.
///
/// Content without a well-formed block is returned whole as the body.
pub fn parse(content: &str) -> (Frontmatter, String) {
    let Some((block, body)) = split_block(content) else {
        return (Frontmatter::default(), content.to_string());
    };

    let mut fm = Frontmatter::default();
    for line in block.lines() {
        let Some((key, value)) = top_level_entry(line) else {
            continue;
        };
        if key == NOTION_ID_KEY {
            if fm.notion_id.is_none() && !value.is_empty() {
                fm.notion_id = Some(unquote(value).to_string());
            }
        } else {
            fm.fields.push((key.to_string(), value.to_string()));
        }
    }

    (fm, body.to_string())
}

/// The document body with any frontmatter block removed
pub fn strip(content: &str) -> String {
    parse(content).1
}

/// Record `id` as the document's `notion-id`.
///
/// Rewrites the first top-level `notion-id` line in place, appends one to an
/// existing block, or prepends a new block. A single blank line separates the
/// block from a non-empty body, and the presence of a trailing newline in
/// `content` is kept as-is.
pub fn set_notion_id(content: &str, id: &str) -> String {
    let had_trailing_newline = content.ends_with('\n');
    let entry = format!("{NOTION_ID_KEY}: {id}");

    let (block, body) = match split_block(content) {
        None => (entry, content),
        Some((block, body)) => {
            let mut lines: Vec<&str> = Vec::new();
            let mut replaced = false;
            for line in block.split('\n').filter(|_| !block.is_empty()) {
                let is_id_line =
                    matches!(top_level_entry(line), Some((key, _)) if key == NOTION_ID_KEY);
                if is_id_line && !replaced {
                    lines.push(&entry);
                    replaced = true;
                } else {
                    lines.push(line);
                }
            }
            if !replaced {
                lines.push(&entry);
            }
            (lines.join("\n"), body)
        }
    };

    let mut out = if body.trim_matches(['\r', '\n']).is_empty() {
        format!("{DELIMITER}\n{block}\n{DELIMITER}\n")
    } else {
        format!("{DELIMITER}\n{block}\n{DELIMITER}\n\n{body}")
    };

    if had_trailing_newline {
        if !out.ends_with('\n') {
            out.push('\n');
        }
    } else {
        let trimmed_len = out.trim_end_matches('\n').len();
        out.truncate(trimmed_len);
    }
    out
}

/// Locate the block. Returns `(block_content, body)`.
///
/// The opening delimiter may be preceded by spaces or tabs, never newlines,
/// and must be followed by a line break. The closing delimiter must sit alone
/// on its own line.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .trim_start_matches([' ', '\t'])
        .strip_prefix(DELIMITER)?;
    let rest = consume_newline(rest)?;

    if let Some(after) = rest.strip_prefix(DELIMITER) {
        if is_line_end(after) {
            return Some(("", after.trim_start_matches(['\r', '\n'])));
        }
    }

    let mut search_from = 0;
    while let Some(pos) = rest[search_from..].find("\n---") {
        let start = search_from + pos;
        let after = &rest[start + 1 + DELIMITER.len()..];
        if is_line_end(after) {
            let block = rest[..start].trim_end_matches('\r');
            return Some((block, after.trim_start_matches(['\r', '\n'])));
        }
        search_from = start + 1;
    }

    None
}

fn consume_newline(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}

fn is_line_end(s: &str) -> bool {
    s.is_empty() || s.starts_with('\n') || s.starts_with("\r\n")
}

/// `key: value` on an unindented, non-comment line
fn top_level_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches([' ', '\t', '\r']);
    if line.is_empty() || line.starts_with('#') || line.starts_with([' ', '\t']) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
