//! Protocol codec
//!
//! Command framing for the outbound side and a line buffer for the
//! inbound side.
//!
//! ## Wire Format
//!
//! ### Set
//! ```text
//! ┌─────┬─────┬─────┬──────────┬───────┬──────┬─────────┬──────┐
//! │ set │ key │ tag │ lifetime │ bytes │ \r\n │ payload │ \r\n │
//! └─────┴─────┴─────┴──────────┴───────┴──────┴─────────┴──────┘
//! ```
//! `bytes` is the payload length in bytes, never in characters.

use bytes::{Buf, Bytes, BytesMut};

use super::Command;
use crate::error::{McError, Result};
use crate::value::TypeTag;

/// Line terminator on the wire
pub const CRLF: &[u8] = b"\r\n";

/// Largest payload a `VALUE` header may announce; memcached's default
/// item size limit
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Vec<u8> {
    match command {
        Command::Set {
            key,
            tag,
            lifetime,
            payload,
        } => build_set(key, *tag, *lifetime, payload),
        Command::Get { keys } => build_get(keys),
        Command::Delete { key } => build_delete(key),
    }
}

/// `set <key> <tag> <lifetime> <bytes>\r\n<payload>\r\n`
pub fn build_set(key: &str, tag: TypeTag, lifetime: u32, payload: &[u8]) -> Vec<u8> {
    let header = format!("set {} {} {} {}\r\n", key, tag.flags(), lifetime, payload.len());

    let mut message = Vec::with_capacity(header.len() + payload.len() + CRLF.len());
    message.extend_from_slice(header.as_bytes());
    message.extend_from_slice(payload);
    message.extend_from_slice(CRLF);
    message
}

/// `get <keys>\r\n`; `keys` may hold several space-separated keys
pub fn build_get(keys: &str) -> Vec<u8> {
    format!("get {}\r\n", keys).into_bytes()
}

/// `delete <key>\r\n`
pub fn build_delete(key: &str) -> Vec<u8> {
    format!("delete {}\r\n", key).into_bytes()
}

// =============================================================================
// Inbound Line Buffer
// =============================================================================

/// Accumulates bytes read from the stream and hands out whole lines.
///
/// An incomplete trailing line stays buffered until the next read
/// completes it.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append freshly read bytes
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Pop the next complete line, without its terminator and with
    /// surrounding whitespace trimmed.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line = self.buf.split_to(pos + 1).freeze();
        Some(trim(line))
    }

    /// Pop a payload of exactly `len` bytes plus its line terminator.
    ///
    /// Returns `Ok(None)` until enough bytes are buffered.
    pub fn take_payload(&mut self, len: usize) -> Result<Option<Bytes>> {
        let tail = match self.buf.get(len..) {
            Some(tail) => tail,
            None => return Ok(None),
        };

        let terminator = if tail.starts_with(CRLF) {
            2
        } else if tail.starts_with(b"\n") {
            1
        } else if tail.is_empty() || tail == b"\r" {
            return Ok(None);
        } else {
            return Err(McError::Protocol(format!(
                "payload of {} bytes not followed by a line terminator",
                len
            )));
        };

        let payload = self.buf.split_to(len).freeze();
        self.buf.advance(terminator);
        Ok(Some(payload))
    }
}

fn trim(mut line: Bytes) -> Bytes {
    let start = line.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    line.truncate(end);
    line.slice(start..)
}
