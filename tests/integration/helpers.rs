//! Shared test helpers: a scripted MCP transport and fixture builders

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

use notion_cli::mcp::{McpError, NotionClient, Transport};

/// Requests seen by a [`ScriptedTransport`], shared with the test
pub type RequestLog = Rc<RefCell<Vec<(String, Value)>>>;

/// Transport that answers `initialize` and then replays tool results in order
pub struct ScriptedTransport {
    replies: VecDeque<Value>,
    log: RequestLog,
}

impl Transport for ScriptedTransport {
    fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        self.log.borrow_mut().push((method.to_string(), params));
        if method == "initialize" {
            return Ok(json!({"protocolVersion": "2025-03-26", "serverInfo": {"name": "test"}}));
        }
        self.replies
            .pop_front()
            .ok_or_else(|| McpError::Protocol("no scripted reply left".into()))
    }

    fn notify(&mut self, _method: &str, _params: Value) -> Result<(), McpError> {
        Ok(())
    }
}

/// Tool result whose first text content is `text`
pub fn text_result(text: &str) -> Value {
    json!({"content": [{"type": "text", "text": text}]})
}

/// Client whose tool calls return `texts` in order
pub fn scripted_client(texts: &[&str]) -> (NotionClient<ScriptedTransport>, RequestLog) {
    let log = RequestLog::default();
    let transport = ScriptedTransport {
        replies: texts.iter().map(|t| text_result(t)).collect(),
        log: Rc::clone(&log),
    };
    (NotionClient::new(transport), log)
}

/// Tool calls made so far as (tool name, arguments)
pub fn tool_calls(log: &RequestLog) -> Vec<(String, Value)> {
    log.borrow()
        .iter()
        .filter(|(method, _)| method == "tools/call")
        .map(|(_, params)| {
            (
                params["name"].as_str().unwrap_or_default().to_string(),
                params["arguments"].clone(),
            )
        })
        .collect()
}

/// JSON body of a `notion-search` result
pub fn search_response(hits: &[(&str, &str, &str)]) -> String {
    let results: Vec<Value> = hits
        .iter()
        .map(|(id, title, object_type)| {
            json!({
                "id": id,
                "title": title,
                "url": format!("https://www.notion.so/{}", id.replace('-', "")),
                "object_type": object_type,
            })
        })
        .collect();
    json!({ "results": results }).to_string()
}

/// Write a markdown file into a fresh temp directory
pub fn write_markdown(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write markdown file");
    (dir, path)
}
