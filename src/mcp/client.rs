//! Typed wrappers around the Notion MCP tools.
//!
//! The session is initialized lazily on the first call: `initialize`, then
//! the `notifications/initialized` notification. Tool results are the text
//! of the first `text` content item.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::token::TokenStore;
use super::transport::{HttpTransport, Transport};
use super::types::{
    Comment, CommentsResponse, CreatePageRequest, CreatePageResponse, FetchPayload, FetchResult,
    PageUpdate, SearchMode, SearchResponse, SearchResult, Tool,
};
use super::McpError;
use crate::config::Config;
use crate::parser::extract_data_source_id;
use crate::reference::extract_uuid;

pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub const TOOL_SEARCH: &str = "notion-search";
pub const TOOL_FETCH: &str = "notion-fetch";
pub const TOOL_CREATE_PAGES: &str = "notion-create-pages";
pub const TOOL_UPDATE_PAGE: &str = "notion-update-page";
pub const TOOL_GET_COMMENTS: &str = "notion-get-comments";
pub const TOOL_CREATE_COMMENT: &str = "notion-create-comment";

const NOTION_URL_PREFIX: &str = "https://www.notion.so/";

pub struct NotionClient<T: Transport = HttpTransport> {
    transport: T,
    initialized: bool,
}

impl NotionClient<HttpTransport> {
    /// Build an HTTP client for `config`.
    ///
    /// The token comes from the config (flag, env or config file) or, failing
    /// that, from the token file. Expired or missing tokens are rejected
    /// before any request is made.
    pub fn connect(config: &Config) -> Result<Self> {
        let token = match &config.access_token {
            Some(token) => token.clone(),
            None => {
                let stored = TokenStore::new(&config.token_path).load()?;
                match stored {
                    Some(t) if t.is_valid() => t.access_token,
                    _ => return Err(McpError::AuthRequired.into()),
                }
            }
        };

        debug!(endpoint = %config.endpoint, "Connecting to Notion MCP server");
        let transport = HttpTransport::new(&config.endpoint, Some(token), config.timeout)
            .context("Failed to build HTTP client")?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> NotionClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            initialized: false,
        }
    }

    fn ensure_initialized(&mut self) -> Result<(), McpError> {
        if self.initialized {
            return Ok(());
        }

        let result = self.transport.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "notion-cli",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )?;
        info!(
            server = result["serverInfo"]["name"].as_str().unwrap_or("unknown"),
            protocol = result["protocolVersion"].as_str().unwrap_or(PROTOCOL_VERSION),
            "MCP session initialized"
        );

        self.transport
            .notify("notifications/initialized", json!({}))?;
        self.initialized = true;
        Ok(())
    }

    /// Invoke a tool and return the text of its first text content item
    pub fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String, McpError> {
        self.ensure_initialized()?;

        debug!(tool = name, "Calling tool");
        let result = self.transport.request(
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )?;

        let text = first_text(&result);
        if result["isError"].as_bool() == Some(true) {
            return Err(McpError::Tool {
                tool: name.to_string(),
                message: text,
            });
        }
        Ok(text)
    }

    pub fn list_tools(&mut self) -> Result<Vec<Tool>, McpError> {
        self.ensure_initialized()?;
        let result = self.transport.request("tools/list", json!({}))?;
        let tools = result.get("tools").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(tools)?)
    }

    pub fn search(
        &mut self,
        query: &str,
        mode: Option<SearchMode>,
    ) -> Result<Vec<SearchResult>, McpError> {
        let mut args = json!({ "query": query });
        if let Some(mode) = mode {
            args["content_search_mode"] = json!(mode.as_str());
        }

        let text = self.call_tool(TOOL_SEARCH, args)?;
        let response: SearchResponse = serde_json::from_str(&text).map_err(|e| {
            McpError::Protocol(format!("failed to parse search response: {e}"))
        })?;
        debug!(query, count = response.results.len(), "Search complete");
        Ok(response.results)
    }

    /// Fetch a page or database by ID or URL.
    ///
    /// Some servers wrap the markup in a `{title, url, text}` object; the
    /// wrapper is removed when `text` is non-empty.
    pub fn fetch(&mut self, id: &str) -> Result<FetchResult, McpError> {
        let text = self.call_tool(TOOL_FETCH, json!({ "id": id }))?;

        if let Ok(payload) = serde_json::from_str::<FetchPayload>(&text) {
            if !payload.text.is_empty() {
                return Ok(FetchResult {
                    content: payload.text,
                    title: payload.title,
                    url: payload.url,
                });
            }
        }

        Ok(FetchResult {
            content: text,
            ..FetchResult::default()
        })
    }

    pub fn create_page(&mut self, request: &CreatePageRequest) -> Result<CreatePageResponse, McpError> {
        let text = self.call_tool(TOOL_CREATE_PAGES, request.to_arguments())?;
        Ok(parse_create_response(&text))
    }

    pub fn update_page(&mut self, page_id: &str, update: &PageUpdate) -> Result<(), McpError> {
        debug!(page_id, command = update.command(), "Updating page");
        self.call_tool(TOOL_UPDATE_PAGE, update.to_arguments(page_id))?;
        Ok(())
    }

    pub fn get_comments(&mut self, page_id: &str) -> Result<CommentsResponse, McpError> {
        let text = self.call_tool(TOOL_GET_COMMENTS, json!({ "page_id": page_id }))?;
        serde_json::from_str(&text)
            .map_err(|e| McpError::Protocol(format!("failed to parse comments: {e}")))
    }

    /// Add a comment to a page, or reply in an existing discussion
    pub fn create_comment(
        &mut self,
        page_id: &str,
        text: &str,
        discussion_id: Option<&str>,
    ) -> Result<Comment, McpError> {
        let mut args = json!({ "page_id": page_id, "text": text });
        if let Some(discussion_id) = discussion_id {
            args["discussion_id"] = json!(discussion_id);
        }

        let response = self.call_tool(TOOL_CREATE_COMMENT, args)?;
        serde_json::from_str(&response)
            .map_err(|e| McpError::Protocol(format!("failed to parse comment: {e}")))
    }

    /// Data source ID for a database, needed as the parent of new rows.
    /// Falls back to the database ID when the fetched markup names none.
    pub fn resolve_data_source_id(&mut self, database_id: &str) -> Result<String, McpError> {
        let fetched = self.fetch(database_id)?;
        Ok(extract_data_source_id(&fetched.content).unwrap_or_else(|| database_id.to_string()))
    }
}

fn first_text(result: &Value) -> String {
    result["content"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|item| item["type"] == "text")
        .and_then(|item| item["text"].as_str())
        .unwrap_or_default()
        .to_string()
}

/// Accepts `{id, url}`, `{pages: [{id, url}]}`, or prose containing a
/// Notion URL.
fn parse_create_response(text: &str) -> CreatePageResponse {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        let page = value
            .get("pages")
            .and_then(|p| p.get(0))
            .unwrap_or(&value);
        if let Ok(response) = serde_json::from_value::<CreatePageResponse>(page.clone()) {
            if !response.url.is_empty() || !response.id.is_empty() {
                return response;
            }
        }
    }

    let url = extract_url_from_text(text).unwrap_or_default();
    let id = extract_uuid(&url).unwrap_or_default();
    CreatePageResponse { id, url }
}

/// First `https://www.notion.so/` URL in free text
pub(crate) fn extract_url_from_text(text: &str) -> Option<String> {
    let start = text.find(NOTION_URL_PREFIX)?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '"' | ')' | '>' | '\''))
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transport that replays canned results and records what was sent
    #[derive(Default)]
    struct ScriptedTransport {
        replies: VecDeque<Result<Value, McpError>>,
        requests: Vec<(String, Value)>,
        notifications: Vec<String>,
    }

    impl ScriptedTransport {
        fn with_tool_replies(texts: &[&str]) -> Self {
            let mut transport = Self::default();
            transport
                .replies
                .push_back(Ok(json!({"protocolVersion": PROTOCOL_VERSION, "serverInfo": {"name": "notion"}})));
            for text in texts {
                transport.replies.push_back(Ok(tool_result(text, false)));
            }
            transport
        }
    }

    impl Transport for ScriptedTransport {
        fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
            self.requests.push((method.to_string(), params));
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(McpError::Protocol("no scripted reply".into())))
        }

        fn notify(&mut self, method: &str, _params: Value) -> Result<(), McpError> {
            self.notifications.push(method.to_string());
            Ok(())
        }
    }

    fn tool_result(text: &str, is_error: bool) -> Value {
        json!({"content": [{"type": "text", "text": text}], "isError": is_error})
    }

    #[test]
    fn test_initializes_once() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&[
            r#"{"results":[]}"#,
            r#"{"results":[]}"#,
        ]));
        client.search("a", None).unwrap();
        client.search("b", None).unwrap();

        let methods: Vec<&str> = client
            .transport
            .requests
            .iter()
            .map(|(m, _)| m.as_str())
            .collect();
        assert_eq!(methods, vec!["initialize", "tools/call", "tools/call"]);
        assert_eq!(
            client.transport.requests[0].1["protocolVersion"],
            PROTOCOL_VERSION
        );
        assert_eq!(
            client.transport.notifications,
            vec!["notifications/initialized"]
        );
    }

    #[test]
    fn test_search_arguments_and_results() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&[
            r#"{"results":[{"id":"1","title":"Roadmap","url":"u","object_type":"page"}]}"#,
        ]));
        let results = client.search("road", Some(SearchMode::Ai)).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Roadmap");
        let (_, params) = &client.transport.requests[1];
        assert_eq!(params["name"], TOOL_SEARCH);
        assert_eq!(
            params["arguments"],
            json!({"query": "road", "content_search_mode": "ai_search"})
        );
    }

    #[test]
    fn test_search_unparseable() {
        let mut client =
            NotionClient::new(ScriptedTransport::with_tool_replies(&["not json"]));
        let err = client.search("x", None).unwrap_err();
        assert!(matches!(err, McpError::Protocol(_)));
    }

    #[test]
    fn test_tool_error() {
        let mut transport = ScriptedTransport::with_tool_replies(&[]);
        transport
            .replies
            .push_back(Ok(tool_result("object not found", true)));
        let mut client = NotionClient::new(transport);

        let err = client.fetch("abc").unwrap_err();
        match err {
            McpError::Tool { tool, message } => {
                assert_eq!(tool, TOOL_FETCH);
                assert_eq!(message, "object not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_auth_error_propagates() {
        let mut transport = ScriptedTransport::default();
        transport.replies.push_back(Err(McpError::AuthRequired));
        let mut client = NotionClient::new(transport);
        assert!(matches!(
            client.list_tools().unwrap_err(),
            McpError::AuthRequired
        ));
    }

    #[test]
    fn test_fetch_unwraps_json_payload() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&[
            r#"{"title":"T","url":"https://www.notion.so/x","text":"<page>hi</page>"}"#,
            "<page>raw</page>",
            r#"{"title":"T","text":""}"#,
        ]));

        let wrapped = client.fetch("1").unwrap();
        assert_eq!(wrapped.content, "<page>hi</page>");
        assert_eq!(wrapped.title, "T");

        let raw = client.fetch("2").unwrap();
        assert_eq!(raw.content, "<page>raw</page>");
        assert!(raw.title.is_empty());

        let empty_text = client.fetch("3").unwrap();
        assert_eq!(empty_text.content, r#"{"title":"T","text":""}"#);
    }

    #[test]
    fn test_create_page_response_forms() {
        assert_eq!(
            parse_create_response(r#"{"id":"abc","url":"https://www.notion.so/abc"}"#).id,
            "abc"
        );
        assert_eq!(
            parse_create_response(r#"{"pages":[{"id":"p1","url":"https://www.notion.so/p1"}]}"#)
                .url,
            "https://www.notion.so/p1"
        );

        let prose = parse_create_response(
            "Created page (https://www.notion.so/New-Page-0123456789abcdef0123456789abcdef).",
        );
        assert_eq!(
            prose.url,
            "https://www.notion.so/New-Page-0123456789abcdef0123456789abcdef"
        );
        assert_eq!(prose.id, "01234567-89ab-cdef-0123-456789abcdef");

        let nothing = parse_create_response("done");
        assert!(nothing.url.is_empty());
    }

    #[test]
    fn test_extract_url_from_text() {
        assert_eq!(
            extract_url_from_text("see https://www.notion.so/abc\nnext").as_deref(),
            Some("https://www.notion.so/abc")
        );
        assert_eq!(
            extract_url_from_text("<a href=\"https://www.notion.so/x\">").as_deref(),
            Some("https://www.notion.so/x")
        );
        assert_eq!(extract_url_from_text("https://example.com"), None);
    }

    #[test]
    fn test_resolve_data_source_id() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&[
            r#"<database><data-source url="collection://11111111-2222-3333-4444-555555555555"></data-source></database>"#,
            "<database></database>",
        ]));
        assert_eq!(
            client.resolve_data_source_id("db").unwrap(),
            "11111111-2222-3333-4444-555555555555"
        );
        assert_eq!(client.resolve_data_source_id("db").unwrap(), "db");
    }

    #[test]
    fn test_update_page_sends_command() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&["ok"]));
        client
            .update_page(
                "pid",
                &PageUpdate::ReplaceContent {
                    new_str: "body".into(),
                },
            )
            .unwrap();

        let (_, params) = &client.transport.requests[1];
        assert_eq!(params["name"], TOOL_UPDATE_PAGE);
        assert_eq!(params["arguments"]["data"]["command"], "replace_content");
    }

    #[test]
    fn test_comments() {
        let mut client = NotionClient::new(ScriptedTransport::with_tool_replies(&[
            r#"{"comments":[{"id":"c1","text":"hello"}],"has_more":false}"#,
            r#"{"id":"c2","text":"reply","discussion_id":"d1"}"#,
        ]));
        let listed = client.get_comments("pid").unwrap();
        assert_eq!(listed.comments[0].text, "hello");

        let created = client.create_comment("pid", "reply", Some("d1")).unwrap();
        assert_eq!(created.discussion_id, "d1");
        let (_, params) = &client.transport.requests[2];
        assert_eq!(
            params["arguments"],
            json!({"page_id": "pid", "text": "reply", "discussion_id": "d1"})
        );
    }

    #[test]
    fn test_list_tools() {
        let mut transport = ScriptedTransport::with_tool_replies(&[]);
        transport.replies.push_back(Ok(json!({"tools": [
            {"name": "notion-search", "description": "Search"},
            {"name": "notion-fetch"}
        ]})));
        let mut client = NotionClient::new(transport);

        let tools = client.list_tools().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[1].description, "");
    }
}
