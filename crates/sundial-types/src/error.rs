//! Error hierarchy shared across Sundial crates.

use thiserror::Error;

/// Errors from tool execution on the host.
///
/// These never cross the transport as JSON-RPC errors. The dispatcher folds
/// them into a tool result with `isError: true`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid input for tool '{tool}': {message}")]
    InvalidInput { tool: String, message: String },

    #[error("Tool '{tool}' panicked")]
    Panicked { tool: String },
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
