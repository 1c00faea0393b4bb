//! Error types for mctag
//!
//! Provides a unified error type for all client operations.

use std::io;

use thiserror::Error;

use crate::value::TypeTag;

/// Result type alias using McError
pub type Result<T> = std::result::Result<T, McError>;

/// Unified error type for mctag operations
#[derive(Debug, Error)]
pub enum McError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Transport write failed: {0}")]
    TransportWrite(#[source] io::Error),

    #[error("Transport read failed: {0}")]
    TransportRead(#[source] io::Error),

    #[error("Connection closed before the response was complete")]
    UnexpectedEof,

    #[error("Session failed after an earlier error; close it or create a new client")]
    SessionFailed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{kind}: {message}")]
    Server { kind: &'static str, message: String },

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Cannot decode {tag:?} payload: {reason}")]
    Decode { tag: TypeTag, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A prepared read is still waiting to be retrieved")]
    ReadInFlight,

    #[error("Pending read does not belong to the outstanding request")]
    StalePending,
}

impl McError {
    /// OS error code carried by a transport failure, if any
    pub fn os_code(&self) -> Option<i32> {
        match self {
            McError::Connection { source, .. } => source.raw_os_error(),
            McError::TransportWrite(e) | McError::TransportRead(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Returns true if the error came from the byte stream itself.
    ///
    /// The client drops its stream after any of these and refuses further
    /// commands with `SessionFailed`.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            McError::Connection { .. }
                | McError::TransportWrite(_)
                | McError::TransportRead(_)
                | McError::UnexpectedEof
        )
    }
}
