//! Notion's MCP server: JSON-RPC transport, tool wrappers and token storage.

pub mod client;
pub mod token;
pub mod transport;
pub mod types;

use thiserror::Error;

pub use client::NotionClient;
pub use token::{StoredToken, TokenStore};
pub use transport::{HttpTransport, Transport};
pub use types::{
    Comment, CommentsResponse, CreatePageRequest, CreatePageResponse, FetchResult, ObjectKind,
    PageUpdate, Parent, SearchMode, SearchResult, Tool,
};

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Not authenticated. Run 'notion auth login <TOKEN>' or set NOTION_TOKEN")]
    AuthRequired,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} - {reason}")]
    Status { status: u16, reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Invalid response: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
