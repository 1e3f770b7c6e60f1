//! JSON-RPC method dispatch for the tool host.
//!
//! Maps one incoming envelope to at most one response envelope. Tool failures
//! are folded into the result payload with `isError: true` so the transport
//! only ever carries protocol-level errors in the `error` member.

use crate::registry::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sundial_types::{
    INVALID_PARAMS, INVALID_REQUEST, IncomingMessage, JSONRPC_VERSION, JsonRpcResponse,
    METHOD_NOT_FOUND, ToolOutput,
};

/// MCP protocol revision this host speaks.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Name and version reported by `initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Routes JSON-RPC requests to the tool registry.
pub struct Dispatcher {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, info: ServerInfo) -> Self {
        Self { registry, info }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one message. Notifications produce no response.
    pub async fn handle(&self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        let Some(id) = msg.id else {
            tracing::debug!("Notification '{}' acknowledged", msg.method);
            return None;
        };

        if msg.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", msg.jsonrpc),
            ));
        }

        tracing::debug!("Dispatching '{}' (id {id})", msg.method);
        let params = msg.params.unwrap_or(Value::Null);
        let outcome = match msg.method.as_str() {
            "initialize" => Ok(self.initialize(&params)),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(serde_json::json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => Ok(serde_json::json!({ "resources": [] })),
            "prompts/list" => Ok(serde_json::json!({ "prompts": [] })),
            other => Err((METHOD_NOT_FOUND, format!("Method not found: {other}"))),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err((code, message)) => JsonRpcResponse::failure(id, code, message),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        serde_json::json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": self.info,
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i64, String)> {
        let params: CallParams = serde_json::from_value(params)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid tools/call params: {e}")))?;
        let arguments = match params.arguments {
            None | Some(Value::Null) => serde_json::json!({}),
            Some(args) => args,
        };

        let output = match self.registry.execute(&params.name, arguments).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {e}", params.name);
                ToolOutput::error(e.to_string())
            }
        };

        Ok(serde_json::to_value(output).unwrap_or_else(|e| {
            serde_json::to_value(ToolOutput::error(format!("Failed to encode result: {e}")))
                .unwrap_or(Value::Null)
        }))
    }
}
