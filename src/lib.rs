//! # mctag
//!
//! A blocking client for the memcached text protocol that keeps the type
//! of every stored value:
//! - `set` / `get` / `delete` over one lazily opened TCP stream
//! - Type tags carried in the memcached flags field
//! - Multi-key fetches demultiplexed by key
//! - Split reads: send a `get` now, read its response later
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │     set_value / get_value / del_value / prepare_get         │
//! └───────┬─────────────────────┬───────────────────────┬───────┘
//!         │                     │                       │
//!         ▼                     ▼                       ▼
//!  ┌─────────────┐      ┌───────────────┐      ┌────────────────┐
//!  │ Value codec │      │ Command       │      │ Response       │
//!  │ (tag+bytes) │◀─────│ encoder       │      │ parser         │
//!  └─────────────┘      └───────┬───────┘      └───────▲────────┘
//!                               │                      │
//!                               ▼                      │
//!                       ┌─────────────────────────────────┐
//!                       │       Transport (TCP)           │
//!                       └─────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mctag::{Client, ClientConfig, Fetched, Value};
//!
//! let mut client = Client::new(ClientConfig::from_env());
//! client.set_value("answer", 42)?;
//!
//! let pending = client.prepare_get("answer")?.expect("non-empty key");
//! // ... other work ...
//! assert_eq!(client.retrieve(pending)?, Fetched::Hit(Value::Int(42)));
//! # Ok::<(), mctag::McError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod value;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{McError, Result};
pub use config::ClientConfig;
pub use network::{Client, Fetched, PendingGet};
pub use value::{TypeTag, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mctag
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
