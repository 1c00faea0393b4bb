//! Client
//!
//! The public API: store, fetch and delete typed values on one memcached
//! endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::transport::{Connector, TcpConnector, Transport};
use crate::config::ClientConfig;
use crate::error::{McError, Result};
use crate::protocol::{encode_command, Command, LineBuffer, ReplyLine, ResponseParser};
use crate::value::{encode, Value};

/// Longest key memcached accepts
pub const MAX_KEY_LEN: usize = 250;

/// Tickets are unique across all clients in the process, so a
/// `PendingGet` handed to the wrong client is caught.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Outcome of a fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Nothing stored under the requested key(s)
    Miss,
    /// The single requested key
    Hit(Value),
    /// Several keys were requested; the ones found, in server order
    Multi(IndexMap<String, Value>),
    /// The key was empty or could not be framed; nothing was sent
    Rejected,
}

impl Fetched {
    pub fn is_miss(&self) -> bool {
        matches!(self, Fetched::Miss)
    }

    /// The value for a single-key hit
    pub fn value(&self) -> Option<&Value> {
        match self {
            Fetched::Hit(value) => Some(value),
            _ => None,
        }
    }

    /// Dynamic view: a miss is `Null`, several keys become an `Object`,
    /// and a rejected key is `Bool(false)`.
    pub fn into_value(self) -> Value {
        match self {
            Fetched::Miss => Value::Null,
            Fetched::Hit(value) => value,
            Fetched::Multi(values) => Value::Object(values),
            Fetched::Rejected => Value::Bool(false),
        }
    }
}

/// A `get` that has been sent but whose response has not been read.
///
/// Hand it back to [`Client::retrieve`]; until then the client refuses
/// other commands.
#[derive(Debug)]
#[must_use = "the response stays on the stream until the PendingGet is retrieved"]
pub struct PendingGet {
    key: String,
    ticket: u64,
}

impl PendingGet {
    /// The key (or space-separated keys) that was requested
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Blocking memcached client over a single stream.
///
/// The stream is opened on the first command. After a transport or framing
/// failure the session is spent: every later call fails with
/// `SessionFailed` until [`Client::close`] is called or a new client is
/// built. Not safe for concurrent use; wrap it in a lock to share it
/// between threads.
pub struct Client<C: Connector = TcpConnector> {
    config: ClientConfig,
    connector: C,
    stream: Option<C::Stream>,
    buffer: LineBuffer,
    chunk: Vec<u8>,
    /// Ticket of the outstanding `prepare_get`, if any
    pending: Option<u64>,
    /// Set by a terminal failure; cleared only by `close`
    failed: bool,
}

impl Client<TcpConnector> {
    /// Create a TCP client. Nothing is connected until the first command.
    pub fn new(config: ClientConfig) -> Self {
        let connector = TcpConnector::from_config(&config);
        Self::with_connector(config, connector)
    }

    /// TCP client for `addr` (host:port) with default settings
    pub fn for_addr(addr: impl Into<String>) -> Result<Self> {
        Ok(Self::new(ClientConfig::builder().addr(addr).build()?))
    }
}

impl<C: Connector> Client<C> {
    /// Create a client over a custom connector
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        let chunk_size = config.read_chunk_size;
        Self {
            config,
            connector,
            stream: None,
            buffer: LineBuffer::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size],
            pending: None,
            failed: false,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true once a transport or framing failure has spent the session
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Returns true while a `PendingGet` is outstanding
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Store a value for the default lifetime.
    ///
    /// Returns true if the server answered `STORED`.
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let lifetime = self.config.default_lifetime;
        self.set_value_for(key, value, lifetime)
    }

    /// Store a value for `lifetime` seconds (0 = never expires)
    pub fn set_value_for(&mut self, key: &str, value: impl Into<Value>, lifetime: u32) -> Result<bool> {
        self.ensure_idle()?;
        if !is_storable_key(key) {
            tracing::debug!("Refusing to store under invalid key {:?}", key);
            return Ok(false);
        }

        let encoded = encode(&value.into())?;
        self.send(&Command::Set {
            key: key.to_string(),
            tag: encoded.tag,
            lifetime,
            payload: encoded.payload,
        })?;

        match self.read_reply_line()? {
            ReplyLine::Stored => Ok(true),
            ReplyLine::ClientError(msg) | ReplyLine::ServerError(msg) => {
                tracing::warn!("set {} rejected by server: {}", key, msg);
                Ok(false)
            }
            other => {
                tracing::debug!("set {} not stored: {:?}", key, other);
                Ok(false)
            }
        }
    }

    /// Fetch one key, or several separated by spaces.
    ///
    /// An empty key, or one that cannot be framed, sends nothing and
    /// yields `Fetched::Rejected`.
    pub fn get_value(&mut self, key: &str) -> Result<Fetched> {
        match self.prepare_get(key)? {
            Some(pending) => self.retrieve(pending),
            None => Ok(Fetched::Rejected),
        }
    }

    /// Fetch several keys in one round trip; always returns the mapping.
    ///
    /// Empty entries are ignored; a key that cannot be framed fails with
    /// `InvalidArgument` before anything is sent.
    pub fn get_many(&mut self, keys: &[&str]) -> Result<IndexMap<String, Value>> {
        self.ensure_idle()?;
        let keys = keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>();
        if let Some(bad) = keys.iter().find(|k| !is_storable_key(k)) {
            return Err(McError::InvalidArgument(format!("cannot fetch key {:?}", bad)));
        }
        if keys.is_empty() {
            return Ok(IndexMap::new());
        }

        self.send(&Command::Get { keys: keys.join(" ") })?;
        self.read_values()
    }

    /// Delete a key. Returns true if the server answered `DELETED`.
    pub fn del_value(&mut self, key: &str) -> Result<bool> {
        self.ensure_idle()?;
        if !is_storable_key(key) {
            return Ok(false);
        }

        self.send(&Command::Delete { key: key.to_string() })?;

        match self.read_reply_line()? {
            ReplyLine::Deleted => Ok(true),
            ReplyLine::ClientError(msg) | ReplyLine::ServerError(msg) => {
                tracing::warn!("delete {} rejected by server: {}", key, msg);
                Ok(false)
            }
            other => {
                tracing::trace!("delete {}: {:?}", key, other);
                Ok(false)
            }
        }
    }

    /// Send a `get` without reading the response.
    ///
    /// Returns `None` for an empty key or one that cannot be framed. Only
    /// one read may be outstanding; a second call before
    /// [`Client::retrieve`] fails with `ReadInFlight`.
    pub fn prepare_get(&mut self, key: &str) -> Result<Option<PendingGet>> {
        self.ensure_idle()?;
        let key = key.trim();
        if !is_fetchable_keys(key) {
            tracing::debug!("Refusing to fetch invalid key {:?}", key);
            return Ok(None);
        }

        self.send(&Command::Get { keys: key.to_string() })?;

        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(ticket);
        Ok(Some(PendingGet {
            key: key.to_string(),
            ticket,
        }))
    }

    /// Read and decode the response to a prepared `get`
    pub fn retrieve(&mut self, pending: PendingGet) -> Result<Fetched> {
        if self.pending != Some(pending.ticket) {
            return Err(McError::StalePending);
        }
        self.pending = None;

        let values = self.read_values()?;
        Ok(shape(&pending.key, values))
    }

    /// Close the stream and clear a failed session. The next command opens
    /// a new stream.
    pub fn close(&mut self) -> Result<()> {
        self.pending = None;
        self.failed = false;
        self.buffer.clear();
        match self.stream.take() {
            Some(mut stream) => {
                tracing::debug!("Closing connection to {}", self.config.addr);
                stream.close().map_err(McError::TransportWrite)
            }
            None => Ok(()),
        }
    }

    // =========================================================================
    // Session Plumbing
    // =========================================================================

    fn ensure_idle(&self) -> Result<()> {
        if self.failed {
            return Err(McError::SessionFailed);
        }
        match self.pending {
            Some(_) => Err(McError::ReadInFlight),
            None => Ok(()),
        }
    }

    fn ensure_connected(&mut self) -> Result<&mut C::Stream> {
        if self.failed {
            return Err(McError::SessionFailed);
        }
        if self.stream.is_none() {
            let opened = self.connector.open(&self.config.addr).map_err(|source| {
                tracing::warn!("Failed to connect to {}: {}", self.config.addr, source);
                McError::Connection {
                    addr: self.config.addr.clone(),
                    source,
                }
            });
            let stream = self.check(opened)?;
            tracing::debug!("Connected to {}", self.config.addr);
            self.buffer.clear();
            self.stream = Some(stream);
        }

        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(McError::UnexpectedEof),
        }
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        let bytes = encode_command(command);
        tracing::trace!(
            "-> {} {:?}",
            command.command_type().verb(),
            String::from_utf8_lossy(&bytes)
        );
        let result = self
            .ensure_connected()?
            .write_all(&bytes)
            .map_err(McError::TransportWrite);
        self.check(result)
    }

    /// Pull one chunk from the stream into the line buffer
    fn read_more(&mut self) -> Result<()> {
        let result = match self.stream.as_mut() {
            Some(stream) => match stream.read_chunk(&mut self.chunk) {
                Ok(0) => Err(McError::UnexpectedEof),
                Ok(n) => {
                    self.buffer.extend(&self.chunk[..n]);
                    Ok(())
                }
                Err(e) => Err(McError::TransportRead(e)),
            },
            None => Err(McError::UnexpectedEof),
        };
        self.check(result)
    }

    fn read_reply_line(&mut self) -> Result<ReplyLine> {
        loop {
            while let Some(line) = self.buffer.next_line() {
                if line.is_empty() {
                    continue;
                }
                let reply = ReplyLine::parse(&line);
                tracing::trace!("<- {:?}", reply);
                return Ok(reply);
            }
            self.read_more()?;
        }
    }

    fn read_values(&mut self) -> Result<IndexMap<String, Value>> {
        let mut parser = ResponseParser::new();
        loop {
            let done = parser.advance(&mut self.buffer);
            if self.check(done)? {
                break;
            }
            self.read_more()?;
        }
        parser.finish()
    }

    /// Mark the session failed when an error leaves the stream unusable.
    ///
    /// There is no reconnect; the caller decides whether to `close` and
    /// start over.
    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_transport() || matches!(e, McError::Protocol(_)) {
                tracing::warn!("Session with {} failed: {}", self.config.addr, e);
                if let Some(mut stream) = self.stream.take() {
                    let _ = stream.close();
                }
                self.buffer.clear();
                self.pending = None;
                self.failed = true;
            }
        }
        result
    }
}

impl<C: Connector> Drop for Client<C> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                tracing::debug!("Error closing connection to {}: {}", self.config.addr, e);
            }
        }
    }
}

/// Keys that can be framed in a storage command
fn is_storable_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control())
}

/// One or more space-separated keys, none of which breaks the command line
fn is_fetchable_keys(keys: &str) -> bool {
    let mut tokens = keys.split(' ').filter(|t| !t.is_empty()).peekable();
    tokens.peek().is_some()
        && !keys.bytes().any(|b| b.is_ascii_control())
        && tokens.all(is_storable_key)
}

/// Bare value for a single requested key, the mapping for several
fn shape(requested: &str, mut values: IndexMap<String, Value>) -> Fetched {
    let mut keys = requested.split_ascii_whitespace();
    match (keys.next(), keys.next()) {
        (Some(key), None) => values.shift_remove(key).map_or(Fetched::Miss, Fetched::Hit),
        _ if values.is_empty() => Fetched::Miss,
        _ => Fetched::Multi(values),
    }
}
