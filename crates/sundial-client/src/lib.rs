//! Request client for a Sundial tool host.
//!
//! Each call builds one JSON-RPC envelope, posts it, and unwraps the single
//! `data: ` frame of the event-stream response into a JSON value. Transport
//! and decoding failures share one error type.

mod client;
mod error;
mod frame;

pub use client::{ACCEPT_HEADER, McpHttpClient};
pub use error::{ClientError, FrameError};
pub use frame::{DATA_PREFIX, DecodeState, FrameDecoder, decode_frame};
