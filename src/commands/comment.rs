use anyhow::Result;
use colored::Colorize;

use super::common::{connect, resolve_page};
use crate::config::Config;
use crate::mcp::Comment;
use crate::output::{self, format_time};

/// Print a page's comments, oldest first
pub fn list(config: &Config, page: &str, json: bool) -> Result<()> {
    let mut client = connect(config)?;
    let page_id = resolve_page(&mut client, page)?;
    let response = client.get_comments(&page_id)?;

    if json {
        return output::print_json(&response.comments);
    }
    if response.comments.is_empty() {
        println!("No comments found.");
        return Ok(());
    }

    print!("{}", render_comments(&response.comments, chrono::Utc::now()));
    if response.has_more {
        println!();
        output::info("More comments available");
    }
    Ok(())
}

fn render_comments(comments: &[Comment], now: chrono::DateTime<chrono::Utc>) -> String {
    let mut out = String::new();
    for (i, comment) in comments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let author = comment.author.as_deref().unwrap_or("Unknown");
        let when = comment
            .created_time
            .as_deref()
            .map(|t| format_time(t, now))
            .unwrap_or_default();
        out.push_str(&format!("{} {}\n", author.bold(), when.dimmed()));
        out.push_str(&comment.text);
        out.push('\n');
    }
    out
}

pub fn create(
    config: &Config,
    page: &str,
    text: &str,
    discussion: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut client = connect(config)?;
    let page_id = resolve_page(&mut client, page)?;
    let comment = client.create_comment(&page_id, text, discussion)?;

    if json {
        return output::print_json(&comment);
    }
    output::success("Comment added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_comments() {
        colored::control::set_override(false);
        let now = chrono::Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let comments = vec![
            Comment {
                id: "c1".into(),
                text: "Looks good".into(),
                author: Some("Sam".into()),
                created_time: Some("2024-06-15T11:00:00Z".into()),
                ..Comment::default()
            },
            Comment {
                id: "c2".into(),
                text: "Ship it".into(),
                ..Comment::default()
            },
        ];

        assert_eq!(
            render_comments(&comments, now),
            "Sam 1 hour ago\nLooks good\n\nUnknown \nShip it\n"
        );
    }
}
