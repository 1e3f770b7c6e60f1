//! Shared types and error hierarchy for Sundial.

pub mod error;
pub mod jsonrpc;
pub mod tool;

pub use error::{ConfigError, ToolError};
pub use jsonrpc::*;
pub use tool::*;
