//! Protocol Module
//!
//! The memcached text protocol, as far as this client speaks it.
//!
//! ## Requests
//! ```text
//! set <key> <tag> <lifetime> <bytes>\r\n<payload>\r\n
//! get <key> [<key> ...]\r\n
//! delete <key>\r\n
//! ```
//!
//! ## Replies
//! ```text
//! STORED | NOT_STORED | EXISTS | NOT_FOUND | DELETED      (single line)
//! VALUE <key> <tag> <bytes>\r\n<payload>\r\n ... END       (retrieval)
//! ERROR | CLIENT_ERROR <msg> | SERVER_ERROR <msg>
//! ```
//!
//! The `tag` is the memcached flags field; see [`crate::value`].

mod codec;
mod command;
mod parser;
mod response;

pub use codec::{build_delete, build_get, build_set, encode_command, LineBuffer, MAX_PAYLOAD_LEN};
pub use command::{Command, CommandType};
pub use parser::ResponseParser;
pub use response::ReplyLine;
