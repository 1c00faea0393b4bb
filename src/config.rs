//! Configuration for mctag
//!
//! Centralized client configuration with sensible defaults.

use std::env;

use crate::error::{McError, Result};

/// Default memcached port
pub const DEFAULT_PORT: u16 = 11211;

/// Main configuration for a mctag client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub addr: String,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Bytes requested from the transport per read
    pub read_chunk_size: usize,

    /// Lifetime in seconds used by `Client::set_value`
    pub default_lifetime: u32,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = block)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = block)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = block)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            read_chunk_size: 4096,
            default_lifetime: 3600,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default config with the address taken from the environment.
    ///
    /// `MEMCACHED_ADDR` (host:port) wins over `MEMCACHED_HOST` (host only).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(addr) = env_addr(env::var("MEMCACHED_ADDR").ok(), env::var("MEMCACHED_HOST").ok()) {
            config.addr = addr;
        }
        config
    }
}

fn env_addr(addr: Option<String>, host: Option<String>) -> Option<String> {
    match (addr, host) {
        (Some(addr), _) if !addr.trim().is_empty() => Some(addr.trim().to_string()),
        (_, Some(host)) if !host.trim().is_empty() => Some(format!("{}:{}", host.trim(), DEFAULT_PORT)),
        _ => None,
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server address (host:port)
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set host and port separately
    pub fn host_port(mut self, host: &str, port: u16) -> Self {
        self.config.addr = format!("{}:{}", host, port);
        self
    }

    /// Set the per-read chunk size (in bytes)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Set the lifetime used when none is given (in seconds)
    pub fn default_lifetime(mut self, secs: u32) -> Self {
        self.config.default_lifetime = secs;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        if self.config.addr.trim().is_empty() {
            return Err(McError::InvalidArgument("server address is empty".to_string()));
        }
        if self.config.read_chunk_size == 0 {
            return Err(McError::InvalidArgument("read chunk size must be non-zero".to_string()));
        }
        Ok(self.config)
    }
}
