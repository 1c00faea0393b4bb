//! Network Module
//!
//! The byte-stream transport and the client built on top of it.
//!
//! ## Architecture
//! - `Connector` opens a `Transport` lazily, on the first command
//! - One command in flight at a time; `prepare_get` / `retrieve` only
//!   defer when the response is read
//! - A transport or framing failure drops the stream and fails the session;
//!   nothing reconnects until the caller calls `close` or builds a new client

mod client;
mod transport;

pub use client::{Client, Fetched, PendingGet};
pub use transport::{Connector, TcpConnector, Transport};
