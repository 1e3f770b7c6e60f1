//! HTTP client for a single tool host endpoint.
//!
//! Requests are strictly sequential from the caller's point of view, but each
//! one still gets a fresh id and the echoed id is checked.

use crate::error::ClientError;
use crate::frame::decode_frame;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use sundial_config::ClientConfig;
use sundial_types::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ToolDefinition, ToolOutput,
};

/// Accept header every request carries.
pub const ACCEPT_HEADER: &str = "application/json, text/event-stream";

/// MCP protocol revision offered during `initialize`.
const PROTOCOL_VERSION: &str = "2025-03-26";

#[derive(Deserialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Deserialize)]
struct ResourcesListResult {
    #[serde(default)]
    resources: Vec<Value>,
}

#[derive(Deserialize)]
struct PromptsListResult {
    #[serde(default)]
    prompts: Vec<Value>,
}

/// Client for one tool host endpoint.
pub struct McpHttpClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Create a client with the transport's default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(url, None)
    }

    /// Create a client, optionally bounding each request by `timeout`.
    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_timeout(
            config.url.clone(),
            config.timeout_ms.map(Duration::from_millis),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and return the decoded response envelope.
    ///
    /// The returned value is the whole envelope (`{"jsonrpc", "id", "result"}`
    /// or `{"jsonrpc", "id", "error"}`), exactly as carried by the data frame.
    pub async fn send(&self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        tracing::debug!("POST {} -> {method} (id {id})", self.url);

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_HEADER)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        tracing::debug!("Raw response for {method}: {body}");
        let value = decode_frame(&body)?;

        match value.get("id") {
            None | Some(Value::Null) => {}
            Some(echoed) if echoed.as_u64() == Some(id) => {}
            Some(echoed) => {
                return Err(ClientError::IdMismatch {
                    expected: id,
                    actual: echoed.clone(),
                });
            }
        }

        Ok(value)
    }

    /// Send a notification. The host acknowledges without a body.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), ClientError> {
        let notification = JsonRpcNotification::new(method, params);
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_HEADER)
            .json(&notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Send a request and unwrap its `result`, turning an `error` member into
    /// [`ClientError::JsonRpc`].
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        let envelope: JsonRpcResponse = serde_json::from_value(self.send(method, params).await?)?;
        if let Some(err) = envelope.error {
            return Err(ClientError::JsonRpc {
                code: err.code,
                message: err.message,
            });
        }
        envelope.result.ok_or_else(|| {
            ClientError::Protocol(format!("{method} response has neither result nor error"))
        })
    }

    /// Perform the `initialize` handshake and return the host's reply.
    pub async fn initialize(&self) -> Result<Value, ClientError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "sundial",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        let result = self.request("initialize", Some(params)).await?;
        self.notify("notifications/initialized", None).await?;
        Ok(result)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.request("ping", None).await.map(|_| ())
    }

    /// Discover the host's tools.
    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ClientError> {
        let result = self.request("tools/list", None).await?;
        let list: ToolsListResult = serde_json::from_value(result).map_err(|e| {
            ClientError::Protocol(format!("Failed to parse tools/list response: {e}"))
        })?;
        Ok(list.tools)
    }

    /// Invoke a tool. A tool-level failure comes back as `Ok` with `is_error`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, ClientError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });
        let result = self.request("tools/call", Some(params)).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Protocol(format!("Failed to parse tools/call result: {e}")))
    }

    pub async fn list_resources(&self) -> Result<Vec<Value>, ClientError> {
        let result = self.request("resources/list", None).await?;
        let list: ResourcesListResult = serde_json::from_value(result)?;
        Ok(list.resources)
    }

    pub async fn list_prompts(&self) -> Result<Vec<Value>, ClientError> {
        let result = self.request("prompts/list", None).await?;
        let list: PromptsListResult = serde_json::from_value(result)?;
        Ok(list.prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_tools_list_result() {
        let json = r#"{
            "tools": [
                {"name": "get_forecast", "description": "Get weather forecast for a city.", "inputSchema": {"type": "object"}},
                {"name": "b", "inputSchema": {"type": "object"}}
            ]
        }"#;
        let result: ToolsListResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.tools.len(), 2);
        assert_eq!(result.tools[0].name, "get_forecast");
        assert!(result.tools[1].description.is_empty());
    }

    #[test]
    fn deserialize_empty_prompt_list() {
        let result: PromptsListResult = serde_json::from_str("{}").unwrap();
        assert!(result.prompts.is_empty());
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = McpHttpClient::new(format!("http://{addr}/mcp")).unwrap();
        let err = client.send("tools/list", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
        assert!(err.to_value()["error"].is_string());
    }
}
