//! Database fetch responses: schema and view summaries, data source ids.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::reference::format_uuid;

static VIEW_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<view url="[^"]*">"#).expect("Invalid regex pattern"));

static COLLECTION_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"collection://([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|[0-9a-fA-F]{32})")
        .expect("Invalid regex pattern")
});

#[derive(Debug, Deserialize)]
struct DataSourceState {
    #[serde(default, deserialize_with = "null_as_default")]
    schema: BTreeMap<String, Column>,
}

#[derive(Debug, Deserialize)]
struct Column {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    options: Vec<SelectOption>,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct View {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: String,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Summarize a database fetch response as Markdown.
///
/// Emits a `## Schema` table from `<data-source-state>` and a `## Views`
/// list from `<views>`. Sections whose JSON does not parse are skipped.
pub fn format_database_content(content: &str) -> String {
    let mut out = String::new();

    if let Some(state) = between(content, "<data-source-state>", "</data-source-state>")
        .and_then(|json| serde_json::from_str::<DataSourceState>(json.trim()).ok())
    {
        out.push_str("## Schema\n\n");
        out.push_str("| Column | Type |\n");
        out.push_str("|--------|------|\n");

        let mut columns: Vec<&Column> = state.schema.values().collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        for column in columns {
            let kind = if column.options.is_empty() {
                column.kind.clone()
            } else {
                let options: Vec<&str> = column.options.iter().map(|o| o.name.as_str()).collect();
                format!("{} ({})", column.kind, options.join(", "))
            };
            out.push_str(&format!("| {} | {} |\n", column.name, kind));
        }
        out.push('\n');
    }

    if content.contains("<views>") {
        out.push_str("## Views\n\n");
        for open in VIEW_OPEN.find_iter(content) {
            let rest = &content[open.end()..];
            let Some(end) = rest.find("</view>") else {
                continue;
            };
            if let Ok(view) = serde_json::from_str::<View>(rest[..end].trim()) {
                out.push_str(&format!("- **{}** ({})\n", view.name, view.kind));
            }
        }
        out.push('\n');
    }

    out
}

/// First `collection://<uuid>` in a fetch response, canonicalized.
pub fn extract_data_source_id(content: &str) -> Option<String> {
    COLLECTION_URL
        .captures(content)
        .and_then(|caps| format_uuid(&caps[1].replace('-', "")))
}

/// Text strictly between the first `open` and the next `close` after it
pub(crate) fn between<'a>(content: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = content.find(open)? + open.len();
    let end = content[start..].find(close)?;
    Some(&content[start..start + end])
}
