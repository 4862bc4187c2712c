//! JSON-RPC 2.0 over MCP's streamable HTTP transport.
//!
//! Every message is a POST to the server endpoint. Replies come back either
//! as a plain JSON body or as a short `text/event-stream` whose `data:` lines
//! carry the JSON-RPC response. The server assigns a session on
//! `initialize` via the `Mcp-Session-Id` header, which is echoed on every
//! later request.

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::McpError;

const JSONRPC_VERSION: &str = "2.0";
const SESSION_HEADER: &str = "Mcp-Session-Id";
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request/response channel to an MCP server
pub trait Transport {
    /// Send a request and wait for its result
    fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError>;

    /// Send a notification; no reply is expected
    fn notify(&mut self, method: &str, params: Value) -> Result<(), McpError>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn has_id(&self, id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }

    pub(crate) fn into_result(self) -> Result<Value, McpError> {
        if let Some(error) = self.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| McpError::Protocol("response has neither result nor error".into()))
    }
}

/// Blocking HTTP transport
pub struct HttpTransport {
    http: Client,
    endpoint: String,
    token: Option<String>,
    session_id: Option<String>,
    next_id: u64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self, McpError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .user_agent(concat!("notion-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            token,
            session_id: None,
            next_id: 1,
        })
    }

    fn post(&mut self, message: &JsonRpcRequest<'_>) -> Result<Response, McpError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request.send()?;
        validate_response_status(&response)?;

        if let Some(session_id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.session_id = Some(session_id.to_string());
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.next_id;
        self.next_id += 1;

        debug!(method, id, "Sending MCP request");
        let response = self.post(&JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            method,
            params,
        })?;

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));
        let body = response.text()?;

        let message = if is_event_stream {
            decode_event_stream(&body, id).ok_or_else(|| {
                McpError::Protocol(format!("no response to request {id} in event stream"))
            })?
        } else {
            serde_json::from_str::<JsonRpcResponse>(&body)?
        };

        debug!(method, id, is_error = message.error.is_some(), "Received MCP response");
        message.into_result()
    }

    fn notify(&mut self, method: &str, params: Value) -> Result<(), McpError> {
        debug!(method, "Sending MCP notification");
        self.post(&JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            method,
            params,
        })?;
        Ok(())
    }
}

/// Map non-success statuses to errors. 401 means the token is missing or
/// rejected.
fn validate_response_status(response: &Response) -> Result<(), McpError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(McpError::AuthRequired);
    }
    if !status.is_success() {
        return Err(McpError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown error").to_string(),
        });
    }
    Ok(())
}

/// Find the JSON-RPC response with `id` in a server-sent event stream.
///
/// Events are separated by blank lines; multiple `data:` lines in one event
/// are joined with newlines. Notifications and unparseable events are
/// skipped.
pub(crate) fn decode_event_stream(body: &str, id: u64) -> Option<JsonRpcResponse> {
    let mut data: Vec<&str> = Vec::new();

    let mut check = |data: &mut Vec<&str>| -> Option<JsonRpcResponse> {
        if data.is_empty() {
            return None;
        }
        let payload = data.join("\n");
        data.clear();
        serde_json::from_str::<JsonRpcResponse>(&payload)
            .ok()
            .filter(|message| message.has_id(id))
    };

    for line in body.lines() {
        if line.is_empty() {
            if let Some(message) = check(&mut data) {
                return Some(message);
            }
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }
    check(&mut data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: Some(3),
            method: "tools/list",
            params: json!({}),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list", "params": {}})
        );

        let notification = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            method: "notifications/initialized",
            params: json!({}),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_into_result() {
        let ok: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{"x":1}}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), json!({"x": 1}));

        let err: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        let e = err.into_result().unwrap_err();
        assert!(matches!(e, McpError::Rpc { code: -32601, .. }));
        assert!(e.to_string().contains("Method not found"));

        let empty: JsonRpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(matches!(empty.into_result(), Err(McpError::Protocol(_))));
    }

    #[test]
    fn test_decode_event_stream() {
        let body = "event: message\n\
data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\",\"params\":{}}\n\
\n\
event: message\n\
data: {\"jsonrpc\":\"2.0\",\"id\":7,\n\
data: \"result\":{\"ok\":true}}\n\
\n";
        let message = decode_event_stream(body, 7).unwrap();
        assert_eq!(message.into_result().unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_decode_event_stream_without_trailing_blank_line() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{}}";
        assert!(decode_event_stream(body, 2).is_some());
        assert!(decode_event_stream(body, 3).is_none());
    }

    #[test]
    fn test_decode_event_stream_crlf() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"a\":1}}\r\n\r\n";
        assert!(decode_event_stream(body, 1).is_some());
    }
}
