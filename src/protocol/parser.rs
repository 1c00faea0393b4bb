//! Retrieval response parser
//!
//! Incremental state machine over a [`LineBuffer`]:
//!
//! ```text
//!            VALUE k f n                payload + \r\n
//!  Header ───────────────▶ Payload ─────────────────────┐
//!    ▲  │                                                │
//!    │  │ END / ERROR                                    │
//!    │  ▼                                                │
//!    │ Done                                              │
//!    └───────────────────────────────────────────────────┘
//! ```
//!
//! Payloads are framed by their declared byte count, so a payload holding
//! `END` or a newline cannot end the response early.

use indexmap::IndexMap;

use super::{LineBuffer, ReplyLine, MAX_PAYLOAD_LEN};
use crate::error::{McError, Result};
use crate::value::{decode, Value};

#[derive(Debug)]
enum State {
    Header,
    Payload { key: String, flags: u32, len: usize },
    Done,
}

/// Collects the records of one `get` response
#[derive(Debug)]
pub struct ResponseParser {
    state: State,
    values: IndexMap<String, Value>,
    /// First decode failure; parsing continues to the terminator so the
    /// stream stays in sync.
    decode_error: Option<McError>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: State::Header,
            values: IndexMap::new(),
            decode_error: None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Consume whatever the buffer holds.
    ///
    /// Returns `Ok(true)` once the terminator line has been seen; `Ok(false)`
    /// means the caller should read more bytes into `buf` and call again.
    pub fn advance(&mut self, buf: &mut LineBuffer) -> Result<bool> {
        loop {
            match self.state {
                State::Done => return Ok(true),
                State::Header => {
                    let line = match buf.next_line() {
                        Some(line) => line,
                        None => return Ok(false),
                    };
                    self.on_header(&line)?;
                }
                State::Payload { len, .. } => {
                    let payload = match buf.take_payload(len)? {
                        Some(payload) => payload,
                        None => return Ok(false),
                    };
                    let State::Payload { key, flags, .. } =
                        std::mem::replace(&mut self.state, State::Header)
                    else {
                        unreachable!("state checked above");
                    };
                    self.on_payload(key, flags, &payload);
                }
            }
        }
    }

    fn on_header(&mut self, line: &[u8]) -> Result<()> {
        match ReplyLine::parse(line) {
            ReplyLine::Value { len, .. } if len > MAX_PAYLOAD_LEN => {
                return Err(McError::Protocol(format!(
                    "payload of {} bytes exceeds the {} byte limit",
                    len, MAX_PAYLOAD_LEN
                )));
            }
            ReplyLine::Value { key, flags, len } => {
                tracing::trace!("VALUE {} flags={} bytes={}", key, flags, len);
                self.state = State::Payload { key, flags, len };
            }
            reply if reply.is_terminator() => {
                self.state = State::Done;
            }
            ReplyLine::ClientError(message) => {
                self.state = State::Done;
                return Err(McError::Server {
                    kind: "CLIENT_ERROR",
                    message,
                });
            }
            ReplyLine::ServerError(message) => {
                self.state = State::Done;
                return Err(McError::Server {
                    kind: "SERVER_ERROR",
                    message,
                });
            }
            ReplyLine::Other(text) if text.starts_with("VALUE") => {
                return Err(McError::Protocol(format!("malformed header: {}", text)));
            }
            other => {
                if !line.is_empty() {
                    tracing::debug!("Skipping unexpected line in get response: {:?}", other);
                }
            }
        }
        Ok(())
    }

    fn on_payload(&mut self, key: String, flags: u32, payload: &[u8]) {
        match decode(payload, flags) {
            Ok(value) => {
                self.values.insert(key, value);
            }
            Err(e) => {
                tracing::warn!("Failed to decode value for key {}: {}", key, e);
                self.decode_error.get_or_insert(e);
            }
        }
    }

    /// Decoded records in server order.
    ///
    /// Fails with the first decode error, if any record failed.
    pub fn finish(self) -> Result<IndexMap<String, Value>> {
        match self.decode_error {
            Some(e) => Err(e),
            None => Ok(self.values),
        }
    }
}
