//! `notion db` subcommands: list databases, show a schema, add entries.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::common::{connect, limit_or_all, list_query, read_body, resolve_database, Summary};
use crate::config::Config;
use crate::mcp::{CreatePageRequest, Parent, SearchMode};
use crate::output::{self, Table};
use crate::parser::parse_envelope;
use crate::reference::short_id;
use crate::utils::truncate;

const TITLE_WIDTH: usize = 40;

pub fn list(config: &Config, query: Option<String>, limit: usize, json: bool) -> Result<()> {
    let mut client = connect(config)?;
    let results = client.search(&list_query(query), Some(SearchMode::Workspace))?;

    let databases: Vec<Summary> = results
        .iter()
        .filter(|r| r.is_database())
        .take(limit_or_all(limit))
        .map(Summary::from)
        .collect();

    if json {
        return output::print_json(&databases);
    }
    if databases.is_empty() {
        println!("No databases found.");
        return Ok(());
    }

    let mut table = Table::new(&["ID", "TITLE", "URL"]);
    for db in &databases {
        table.add_row(vec![
            short_id(&db.id),
            truncate(&db.title, TITLE_WIDTH),
            db.url.clone(),
        ]);
    }
    table.print();
    Ok(())
}

/// Show a database's schema and views
pub fn query(config: &Config, database: &str, json: bool) -> Result<()> {
    let mut client = connect(config)?;
    let database_id = resolve_database(&mut client, database)?;
    let fetched = client.fetch(&database_id)?;

    if fetched.content.trim().is_empty() {
        output::warning("No content found");
        return Ok(());
    }

    let envelope = parse_envelope(&fetched.content);
    if json {
        return output::print_json(&envelope);
    }
    output::print_page(&envelope);
    Ok(())
}

/// Parse repeated `-P key=value` flags. Values may contain `=`.
pub fn parse_properties(props: &[String]) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for prop in props {
        match prop.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                properties.insert(key.trim().to_string(), value.to_string());
            }
            _ => bail!("invalid property format (expected key=value): {prop}"),
        }
    }
    Ok(properties)
}

pub struct NewEntry<'a> {
    pub title: String,
    pub properties: Vec<String>,
    pub content: Option<String>,
    pub file: Option<&'a Path>,
}

/// Add a row to a database
pub fn create(config: &Config, database: &str, entry: NewEntry<'_>, json: bool) -> Result<()> {
    let properties = parse_properties(&entry.properties)?;
    let body = read_body(entry.content, entry.file)?;

    let mut client = connect(config)?;
    let database_id = resolve_database(&mut client, database)?;
    let data_source_id = client.resolve_data_source_id(&database_id)?;
    info!(database = %database_id, data_source = %data_source_id, "Creating database entry");

    let created = client.create_page(&CreatePageRequest {
        parent: Some(Parent::DataSource(data_source_id)),
        title: entry.title.clone(),
        content: body,
        icon: None,
        properties,
    })?;

    if json {
        return output::print_json(&Summary {
            id: created.id,
            title: entry.title,
            url: created.url,
            ..Summary::default()
        });
    }

    if created.url.is_empty() {
        output::success("Entry created");
    } else {
        output::success(&format!("Entry created: {}", created.url));
    }
    Ok(())
}
