use anyhow::Result;
use serde::Serialize;

use super::common::{connect, limit_or_all};
use crate::config::Config;
use crate::mcp::{SearchMode, SearchResult};
use crate::output::{self, format_type, Table};
use crate::reference::short_id;
use crate::utils::truncate;

const TITLE_WIDTH: usize = 50;

#[derive(Debug, Serialize)]
struct SearchRow {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    url: String,
}

impl From<&SearchResult> for SearchRow {
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.id.clone(),
            kind: result.category().to_string(),
            title: result.title.clone(),
            url: result.url.clone(),
        }
    }
}

/// Search the workspace (or connected sources in AI mode)
pub fn execute(
    config: &Config,
    query: &str,
    limit: usize,
    mode: SearchMode,
    json: bool,
) -> Result<()> {
    let mut client = connect(config)?;
    let results = client.search(query, Some(mode))?;

    let rows: Vec<SearchRow> = results
        .iter()
        .take(limit_or_all(limit))
        .map(SearchRow::from)
        .collect();

    if json {
        return output::print_json(&rows);
    }
    if rows.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    let mut table = Table::new(&["TYPE", "ID", "TITLE", "URL"]);
    for row in &rows {
        table.add_row(vec![
            format_type(&row.kind),
            short_id(&row.id),
            truncate(&row.title, TITLE_WIDTH),
            row.url.clone(),
        ]);
    }
    table.print();
    Ok(())
}
