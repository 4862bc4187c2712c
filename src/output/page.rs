//! Header shown above a fetched page or database.

use colored::Colorize;

use super::is_tty;
use crate::parser::{Ancestor, Envelope};

const RULE_WIDTH: usize = 60;

/// `Root › Parent` for the ancestor chain, if there is one
pub fn breadcrumb(ancestors: &[Ancestor]) -> Option<String> {
    if ancestors.is_empty() {
        return None;
    }
    let titles: Vec<&str> = ancestors
        .iter()
        .map(|a| if a.title.is_empty() { "Untitled" } else { a.title.as_str() })
        .collect();
    Some(titles.join(" › "))
}

/// Header lines for `envelope`, ending in a blank line. Empty when the
/// response had no recognizable metadata.
pub fn render_header(envelope: &Envelope, tty: bool) -> String {
    if envelope.is_unstructured() {
        return String::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let path = breadcrumb(&envelope.ancestors);

    if tty {
        if let Some(path) = path {
            lines.push(path.dimmed().to_string());
        }
        if !envelope.title.is_empty() {
            lines.push(envelope.title.bold().to_string());
        }
        if !envelope.url.is_empty() {
            lines.push(envelope.url.dimmed().to_string());
        }
        if let Some(kind) = envelope.object_type {
            lines.push(format!("{} {}", "Type:".dimmed(), kind));
        }
        lines.push("─".repeat(RULE_WIDTH).dimmed().to_string());
    } else {
        if let Some(path) = path {
            lines.push(format!("Path: {path}"));
        }
        if !envelope.title.is_empty() {
            lines.push(format!("Title: {}", envelope.title));
        }
        if !envelope.url.is_empty() {
            lines.push(format!("URL: {}", envelope.url));
        }
        if let Some(created) = &envelope.created {
            lines.push(format!("Created: {created}"));
        }
    }

    let mut out = lines.join("\n");
    out.push_str("\n\n");
    out
}

pub fn print_page(envelope: &Envelope) {
    print!("{}", render_header(envelope, is_tty()));
    println!("{}", envelope.body);
}
