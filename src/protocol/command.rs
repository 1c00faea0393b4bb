//! Command definitions
//!
//! Represents commands sent to the server.

use crate::value::TypeTag;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Delete,
}

impl CommandType {
    /// Verb as written on the wire
    pub fn verb(self) -> &'static str {
        match self {
            CommandType::Set => "set",
            CommandType::Get => "get",
            CommandType::Delete => "delete",
        }
    }
}

/// A command ready to be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a payload under a key
    Set {
        key: String,
        tag: TypeTag,
        lifetime: u32,
        payload: Vec<u8>,
    },

    /// Fetch one key, or several separated by spaces
    Get { keys: String },

    /// Delete a key
    Delete { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
        }
    }
}
