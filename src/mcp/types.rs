//! Request and response shapes for the Notion MCP tools.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Object category used to filter search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Page,
    Database,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Page => write!(f, "page"),
            ObjectKind::Database => write!(f, "database"),
        }
    }
}

/// `content_search_mode` argument of `notion-search`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Workspace,
    Ai,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Workspace => "workspace_search",
            SearchMode::Ai => "ai_search",
        }
    }
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "workspace" | "workspace_search" => Ok(SearchMode::Workspace),
            "ai" | "ai_search" => Ok(SearchMode::Ai),
            _ => Err(anyhow!(
                "Unsupported search mode: {s}. Supported modes: workspace, ai"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One hit from `notion-search`.
///
/// The server has reported the category under several field names over
/// time, so all of them are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SearchResult {
    pub fn is_page(&self) -> bool {
        self.object_type == "page" || self.object == "page"
    }

    pub fn is_database(&self) -> bool {
        self.object_type == "database"
            || self.object == "database"
            || self.object_type == "data_source"
            || self.kind == "database"
    }

    pub fn is_kind(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Page => self.is_page(),
            ObjectKind::Database => self.is_database(),
        }
    }

    /// Display category: "page", "database", or whatever the server said
    pub fn category(&self) -> &str {
        if self.is_page() {
            "page"
        } else if self.is_database() {
            "database"
        } else if !self.object_type.is_empty() {
            &self.object_type
        } else if !self.object.is_empty() {
            &self.object
        } else {
            &self.kind
        }
    }
}

/// Result of `notion-fetch`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub content: String,
    pub title: String,
    pub url: String,
}

/// JSON form some servers use to wrap fetch output
#[derive(Debug, Deserialize)]
pub(crate) struct FetchPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// Where a new page is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    Page(String),
    DataSource(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePageRequest {
    pub parent: Option<Parent>,
    pub title: String,
    pub content: String,
    pub icon: Option<String>,
    /// Extra properties for database rows
    pub properties: BTreeMap<String, String>,
}

impl CreatePageRequest {
    /// Arguments for `notion-create-pages`
    pub fn to_arguments(&self) -> Value {
        let mut properties = Map::new();
        for (key, value) in &self.properties {
            properties.insert(key.clone(), Value::String(value.clone()));
        }
        properties.insert("title".to_string(), Value::String(self.title.clone()));

        let mut page = Map::new();
        page.insert("properties".to_string(), Value::Object(properties));
        if !self.content.is_empty() {
            page.insert("content".to_string(), Value::String(self.content.clone()));
        }
        if let Some(icon) = &self.icon {
            page.insert("icon".to_string(), Value::String(icon.clone()));
        }

        let mut args = json!({ "pages": [Value::Object(page)] });
        match &self.parent {
            Some(Parent::Page(id)) => args["parent"] = json!({ "page_id": id }),
            Some(Parent::DataSource(id)) => args["parent"] = json!({ "data_source_id": id }),
            None => {}
        }
        args
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatePageResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// Edit applied by `notion-update-page`
#[derive(Debug, Clone, PartialEq)]
pub enum PageUpdate {
    /// Replace the whole body
    ReplaceContent { new_str: String },
    /// Replace the range matched by a selection (`start...end`)
    ReplaceRange { selection: String, new_str: String },
    /// Insert after the range matched by a selection
    InsertAfter { selection: String, new_str: String },
    UpdateProperties { properties: Map<String, Value> },
}

impl PageUpdate {
    pub fn command(&self) -> &'static str {
        match self {
            PageUpdate::ReplaceContent { .. } => "replace_content",
            PageUpdate::ReplaceRange { .. } => "replace_content_range",
            PageUpdate::InsertAfter { .. } => "insert_content_after",
            PageUpdate::UpdateProperties { .. } => "update_properties",
        }
    }

    /// Arguments for `notion-update-page`
    pub fn to_arguments(&self, page_id: &str) -> Value {
        let mut data = json!({
            "page_id": page_id,
            "command": self.command(),
        });
        match self {
            PageUpdate::ReplaceContent { new_str } => data["new_str"] = json!(new_str),
            PageUpdate::ReplaceRange { selection, new_str }
            | PageUpdate::InsertAfter { selection, new_str } => {
                data["selection_with_ellipsis"] = json!(selection);
                data["new_str"] = json!(new_str);
            }
            PageUpdate::UpdateProperties { properties } => {
                data["properties"] = Value::Object(properties.clone());
            }
        }
        json!({ "data": data })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub discussion_id: String,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentsResponse {
    #[serde(default, alias = "results")]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Entry from `tools/list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: String,
}
