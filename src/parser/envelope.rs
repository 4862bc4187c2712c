//! Parsing of `notion-fetch` responses.
//!
//! A fetched page arrives as a text envelope:
//!
//! ```text
//! <page url="{{https://www.notion.so/...}}">
//! <ancestor-path>
//! <parent-page url="..." title="Pipelines"/>
//! <ancestor-2-page url="..." title="Teams"/>
//! </ancestor-path>
//! <properties>
//! {"title":"My Page"}
//! </properties>
//! <content>
//! ...notion markup...
//! </content>
//! </page>
//! ```
//!
//! Databases carry a title line, a `<data-source-state>` schema and `<views>`
//! instead of `<content>`. Anything else is passed through untouched.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

use super::database::{between, format_database_content};
use super::markup::{clean_url, notion_to_markdown, tree, Node};

static PAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<page url="\{\{([^}]+)\}\}""#).expect("Invalid regex pattern"));

static CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<content>\s*(.*?)\s*</content>").expect("Invalid regex pattern")
});

const DATABASE_TITLE_PREFIX: &str = "The title of this Database is:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Page,
    Database,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Page => write!(f, "page"),
            ObjectType::Database => write!(f, "database"),
        }
    }
}

/// One breadcrumb entry above a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ancestor {
    pub title: String,
    pub url: String,
}

/// Structured view of a fetch response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Root first, immediate parent last
    pub ancestors: Vec<Ancestor>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Markdown body, or the raw response when no structure was recognized
    pub body: String,
}

impl Envelope {
    /// True when neither a title nor a URL was found
    pub fn is_unstructured(&self) -> bool {
        self.title.is_empty() && self.url.is_empty()
    }
}

/// Parse a fetch response. Never fails.
pub fn parse_envelope(raw: &str) -> Envelope {
    let mut envelope = Envelope {
        ancestors: parse_ancestors(raw),
        ..Envelope::default()
    };

    if let Some(caps) = PAGE_URL.captures(raw) {
        envelope.url = caps[1].to_string();
    }

    if let Some(props) = between(raw, "<properties>", "</properties>")
        .and_then(|json| serde_json::from_str::<Map<String, Value>>(json.trim()).ok())
    {
        apply_properties(&mut envelope, &props);
    }

    if let Some(caps) = CONTENT.captures(raw) {
        envelope.object_type = Some(ObjectType::Page);
        envelope.body = notion_to_markdown(&caps[1]);
        return envelope;
    }

    if raw.contains("<database") {
        envelope.object_type = Some(ObjectType::Database);
        if let Some(title) = raw
            .lines()
            .find_map(|line| line.strip_prefix(DATABASE_TITLE_PREFIX))
        {
            envelope.title = title.trim().to_string();
        }
        envelope.body = format_database_content(raw);
        return envelope;
    }

    envelope.body = raw.to_string();
    envelope
}

fn apply_properties(envelope: &mut Envelope, props: &Map<String, Value>) {
    let str_field = |key: &str| props.get(key).and_then(Value::as_str);

    if let Some(title) = str_field("Name").or_else(|| str_field("title")) {
        envelope.title = title.to_string();
    }
    if let Some(url) = str_field("url") {
        envelope.url = clean_url(url);
    }
    if let Some(created) = str_field("Created") {
        envelope.created = Some(created.to_string());
    }
}

/// Breadcrumbs from `<ancestor-path>`, reordered root first.
///
/// `parent-page` is depth 1 and `ancestor-N-page` is depth N, so sorting by
/// descending depth puts the most distant ancestor first.
fn parse_ancestors(raw: &str) -> Vec<Ancestor> {
    let Some(block) = between(raw, "<ancestor-path>", "</ancestor-path>") else {
        return Vec::new();
    };
    let Ok(nodes) = tree::parse(block) else {
        return Vec::new();
    };

    let mut found: Vec<(usize, Ancestor)> = nodes
        .iter()
        .filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
        .filter_map(|el| {
            let depth = ancestor_depth(&el.name)?;
            let ancestor = Ancestor {
                title: el.attr("title").unwrap_or_default().to_string(),
                url: clean_url(el.attr("url").unwrap_or_default()),
            };
            Some((depth, ancestor))
        })
        .collect();

    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().map(|(_, ancestor)| ancestor).collect()
}

fn ancestor_depth(tag: &str) -> Option<usize> {
    if tag == "parent-page" {
        return Some(1);
    }
    tag.strip_prefix("ancestor-")?
        .strip_suffix("-page")?
        .parse()
        .ok()
}
