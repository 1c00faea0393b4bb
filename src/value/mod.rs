//! Value Module
//!
//! The typed values this client stores, and how they are carried over a
//! protocol that only knows bytes.
//!
//! ## Type Tags
//!
//! The memcached `flags` field of every stored item holds a [`TypeTag`]:
//!
//! | tag | type       | payload                          |
//! |-----|------------|----------------------------------|
//! | 1   | Int        | decimal text, `-123`             |
//! | 2   | Bool       | `1` for true, zero bytes for false |
//! | 3   | Float      | decimal text, `123.456`          |
//! | 4   | Sequence   | JSON array                       |
//! | 5   | Object     | JSON object                      |
//! | 6   | String     | JSON string                      |
//! | 7   | Null       | `null`                           |
//!
//! JSON here is an internal framing detail: it keeps newlines and other
//! protocol-sensitive text out of the payload line. Items written by other
//! memcached clients (unknown flags) come back as raw text.

mod codec;
mod types;

pub use codec::{decode, encode, Encoded};
pub use types::{TypeTag, Value};
