//! Stateless tool host for Sundial.
//!
//! Tools are registered by name at construction. Each `POST` to the endpoint
//! carries one JSON-RPC envelope and is answered with a single event-stream
//! frame. No session state survives between requests.

mod dispatch;
mod error;
mod forecast;
mod http;
mod registry;

pub use dispatch::{Dispatcher, PROTOCOL_VERSION, ServerInfo};
pub use error::HostError;
pub use forecast::ForecastTool;
pub use http::{router, serve, serve_with_listener};
pub use registry::ToolRegistry;
