//! Single-frame decoder for event-stream responses.
//!
//! A single-shot response carries exactly one `data: ` line holding the
//! JSON-RPC envelope. Other lines (`event:`, `id:`, `:` comments) are skipped.
//! The decoder walks the body line by line:
//!
//! ```text
//! Scanning --data line--> FoundData --blank line / end--> Parsed | Failed
//! Scanning --end of input--> Exhausted --> Failed
//! ```

use crate::error::FrameError;
use serde_json::Value;

/// Marker that introduces the result-bearing line.
pub const DATA_PREFIX: &str = "data: ";

/// Where the decoder is in the body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeState {
    /// No data line seen yet.
    Scanning,
    /// Data line seen; its payload waits for the frame to end.
    FoundData(String),
    /// Input ended without a data line.
    Exhausted,
    /// Payload parsed as JSON.
    Parsed(Value),
    /// No data line before end of input, or the payload was not JSON.
    Failed(FrameError),
}

impl DecodeState {
    /// `Parsed` and `Failed` accept no further input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecodeState::Parsed(_) | DecodeState::Failed(_))
    }
}

/// Line-driven decoder for one framed response.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecodeState::Scanning,
        }
    }

    pub fn state(&self) -> &DecodeState {
        &self.state
    }

    /// Feed one line (without its newline; a trailing `\r` is tolerated).
    pub fn push_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let next = match std::mem::replace(&mut self.state, DecodeState::Scanning) {
            DecodeState::Scanning => match line.strip_prefix(DATA_PREFIX) {
                Some(payload) => DecodeState::FoundData(payload.to_string()),
                None => DecodeState::Scanning,
            },
            DecodeState::FoundData(payload) if line.is_empty() => parse(&payload),
            other => other,
        };
        self.state = next;
    }

    /// Signal that the transport closed and drive to a terminal state.
    pub fn end_of_input(&mut self) {
        while !self.state.is_terminal() {
            self.state = match std::mem::replace(&mut self.state, DecodeState::Scanning) {
                DecodeState::Scanning => DecodeState::Exhausted,
                DecodeState::Exhausted => {
                    tracing::debug!("Response ended without a data line");
                    DecodeState::Failed(FrameError::NoData)
                }
                DecodeState::FoundData(payload) => parse(&payload),
                terminal => terminal,
            };
        }
    }

    /// Finish decoding and return the parsed value.
    pub fn finish(mut self) -> Result<Value, FrameError> {
        self.end_of_input();
        match self.state {
            DecodeState::Parsed(value) => Ok(value),
            DecodeState::Failed(err) => Err(err),
            DecodeState::Scanning | DecodeState::Exhausted | DecodeState::FoundData(_) => {
                Err(FrameError::NoData)
            }
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(payload: &str) -> DecodeState {
    match serde_json::from_str(payload) {
        Ok(value) => DecodeState::Parsed(value),
        Err(e) => DecodeState::Failed(FrameError::Malformed {
            message: e.to_string(),
        }),
    }
}

/// Decode a complete response body into the JSON value of its data line.
pub fn decode_frame(body: &str) -> Result<Value, FrameError> {
    let mut decoder = FrameDecoder::new();
    for line in body.split('\n') {
        decoder.push_line(line);
        if decoder.state().is_terminal() {
            break;
        }
    }
    decoder.finish()
}
