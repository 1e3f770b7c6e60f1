//! Error types for client requests.

use thiserror::Error;

/// Errors while unwrapping an event-stream response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("No data found in SSE response")]
    NoData,

    #[error("Malformed data frame: {message}")]
    Malformed { message: String },
}

/// Every way a single request can fail.
///
/// Transport failures and decoding failures land here alike, so callers have
/// one failure channel to check.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("JSON-RPC error (code {code}): {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Response id {actual} does not match request id {expected}")]
    IdMismatch {
        expected: u64,
        actual: serde_json::Value,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The `{"error": "<message>"}` value shape for callers that print raw JSON.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_has_fixed_message() {
        let err = ClientError::from(FrameError::NoData);
        assert_eq!(err.to_string(), "No data found in SSE response");
        assert_eq!(
            err.to_value(),
            serde_json::json!({"error": "No data found in SSE response"})
        );
    }

    #[test]
    fn status_error_value() {
        let err = ClientError::Status {
            status: 406,
            body: "not acceptable".into(),
        };
        assert_eq!(err.to_value()["error"], "HTTP 406: not acceptable");
    }
}
