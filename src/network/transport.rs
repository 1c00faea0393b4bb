//! Transport
//!
//! The byte stream the client talks through, and how it is opened.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;

/// A connected byte stream
pub trait Transport {
    /// Write every byte or fail
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read whatever is available, up to `buf.len()` bytes.
    ///
    /// Blocks until at least one byte arrives. `Ok(0)` means the peer
    /// closed the stream.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn close(&mut self) -> io::Result<()>;
}

/// Opens transports to an address
pub trait Connector {
    type Stream: Transport;

    fn open(&self, addr: &str) -> io::Result<Self::Stream>;
}

/// Plain TCP connector
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    nodelay: bool,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl TcpConnector {
    /// Socket options from the client config. A zero timeout means none.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: millis(config.connect_timeout_ms),
            read_timeout: millis(config.read_timeout_ms),
            write_timeout: millis(config.write_timeout_ms),
            nodelay: config.nodelay,
        }
    }

    fn connect(&self, addr: &str) -> io::Result<TcpStream> {
        let timeout = match self.connect_timeout {
            Some(timeout) => timeout,
            None => return TcpStream::connect(addr),
        };

        let mut last_err = None;
        for sock_addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&sock_addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{} resolved to no addresses", addr))
        }))
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn open(&self, addr: &str) -> io::Result<TcpStream> {
        let stream = self.connect(addr)?;

        stream.set_nodelay(self.nodelay)?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;

        Ok(stream)
    }
}

impl Transport for TcpStream {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(self, bytes)?;
        Write::flush(self)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match Read::read(self, buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }
}
