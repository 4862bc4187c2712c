//! `notion page` subcommands.
//!
//! `upload` keeps a local markdown file linked to its Notion page through a
//! `notion-id` frontmatter entry: the first upload creates the page and
//! writes the ID back, later uploads replace the page body in place.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::common::{
    connect, limit_or_all, list_query, page_url, resolve_page, resolve_parent, split_icon,
    upload_title, Summary,
};
use crate::config::Config;
use crate::mcp::{CreatePageRequest, PageUpdate};
use crate::output::{self, format_time, Table};
use crate::parser::{frontmatter, parse_envelope};
use crate::reference::short_id;
use crate::utils::{display_path, truncate};

const TITLE_WIDTH: usize = 50;

/// List pages matching a query (all pages when empty)
pub fn list(config: &Config, query: Option<String>, limit: usize, json: bool) -> Result<()> {
    let mut client = connect(config)?;
    let results = client.search(&list_query(query), None)?;

    let pages: Vec<Summary> = results
        .iter()
        .filter(|r| r.is_page())
        .take(limit_or_all(limit))
        .map(Summary::from)
        .collect();

    if json {
        return output::print_json(&pages);
    }
    if pages.is_empty() {
        println!("No pages found.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    let mut table = Table::new(&["ID", "TITLE", "LAST EDITED", "URL"]);
    for page in &pages {
        table.add_row(vec![
            short_id(&page.id),
            truncate(&page.title, TITLE_WIDTH),
            page.last_edited
                .as_deref()
                .map(|t| format_time(t, now))
                .unwrap_or_default(),
            page.url.clone(),
        ]);
    }
    table.print();
    Ok(())
}

/// Fetch a page and print it as markdown
pub fn view(config: &Config, page: &str, json: bool, raw: bool) -> Result<()> {
    let mut client = connect(config)?;
    let page_id = resolve_page(&mut client, page)?;
    let fetched = client.fetch(&page_id)?;

    if fetched.content.trim().is_empty() {
        output::warning("No content found");
        return Ok(());
    }
    if raw {
        println!("{}", fetched.content);
        return Ok(());
    }

    let mut envelope = parse_envelope(&fetched.content);
    if envelope.title.is_empty() {
        envelope.title = fetched.title;
    }
    if envelope.url.is_empty() {
        envelope.url = fetched.url;
    }

    if json {
        return output::print_json(&envelope);
    }
    output::print_page(&envelope);
    Ok(())
}

pub fn create(
    config: &Config,
    title: String,
    parent: Option<String>,
    content: Option<String>,
    json: bool,
) -> Result<()> {
    let mut client = connect(config)?;
    let parent = resolve_parent(&mut client, parent.as_deref())?;

    let request = CreatePageRequest {
        parent,
        title: title.clone(),
        content: content.unwrap_or_default(),
        ..CreatePageRequest::default()
    };
    let created = client.create_page(&request)?;
    info!(id = %created.id, "Page created");

    if json {
        return output::print_json(&Summary {
            id: created.id,
            title,
            url: created.url,
            ..Summary::default()
        });
    }

    if created.url.is_empty() {
        output::success("Page created");
    } else {
        output::success(&format!("Page created: {}", created.url));
    }
    Ok(())
}

/// What an upload will send, derived from the local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    /// Page already linked to this file, if any
    pub notion_id: Option<String>,
    pub title: String,
    pub icon: Option<String>,
    /// File content without its frontmatter
    pub body: String,
}

impl UploadPlan {
    pub fn from_file(
        content: &str,
        path: &Path,
        title: Option<String>,
        icon: Option<String>,
    ) -> Self {
        let (fm, body) = frontmatter::parse(content);
        let title = upload_title(title, &body, path);
        let (icon, title) = match icon.filter(|i| !i.trim().is_empty()) {
            Some(icon) => (Some(icon), title),
            None => split_icon(&title),
        };

        Self {
            notion_id: fm.notion_id,
            title,
            icon,
            body,
        }
    }

    pub fn display_title(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Push a markdown file to Notion, creating or updating its linked page
pub fn upload(
    config: &Config,
    file: &Path,
    title: Option<String>,
    parent: Option<String>,
    icon: Option<String>,
    json: bool,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let plan = UploadPlan::from_file(&content, file, title, icon);

    let mut client = connect(config)?;

    let (id, url, updated) = match &plan.notion_id {
        Some(id) => {
            if parent.is_some() {
                debug!(id = %id, "Ignoring --parent for a file already linked to a page");
            }
            client.update_page(
                id,
                &PageUpdate::ReplaceContent {
                    new_str: plan.body.clone(),
                },
            )?;
            (id.clone(), page_url(id), true)
        }
        None => {
            let parent = resolve_parent(&mut client, parent.as_deref())?;
            let created = client.create_page(&CreatePageRequest {
                parent,
                title: plan.title.clone(),
                content: plan.body.clone(),
                icon: plan.icon.clone(),
                ..CreatePageRequest::default()
            })?;

            if created.id.is_empty() {
                output::warning("Page created but no ID was returned; frontmatter not updated");
            } else {
                fs::write(file, frontmatter::set_notion_id(&content, &created.id))
                    .with_context(|| format!("Failed to update frontmatter in: {}", file.display()))?;
                debug!(id = %created.id, "Linked file to page");
            }
            (created.id, created.url, false)
        }
    };

    if json {
        return output::print_json(&Summary {
            id,
            title: plan.display_title(),
            url,
            icon: plan.icon.clone(),
            last_edited: None,
        });
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let verb = if updated { "Updated" } else { "Uploaded" };
    output::success(&format!(
        "{verb}: {} {}",
        plan.display_title(),
        format!("({})", display_path(file, &cwd)).dimmed()
    ));
    if !url.is_empty() {
        output::info(&url);
    }
    Ok(())
}

/// Build the update for `page edit` from its flags
pub fn edit_request(
    replace: Option<String>,
    find: Option<String>,
    replace_with: Option<String>,
    append: Option<String>,
) -> Result<PageUpdate> {
    match (replace, find, replace_with, append) {
        (Some(new_str), None, None, None) => Ok(PageUpdate::ReplaceContent { new_str }),
        (None, Some(selection), Some(new_str), None) => {
            Ok(PageUpdate::ReplaceRange { selection, new_str })
        }
        (None, Some(selection), None, Some(new_str)) => {
            Ok(PageUpdate::InsertAfter { selection, new_str })
        }
        _ => bail!("specify --replace, or --find with --replace-with or --append"),
    }
}

pub fn edit(config: &Config, page: &str, update: PageUpdate) -> Result<()> {
    let mut client = connect(config)?;
    let page_id = resolve_page(&mut client, page)?;
    client.update_page(&page_id, &update)?;
    output::success("Page updated");
    Ok(())
}
