//! Shared test fixtures
//!
//! - `FakeMemcached`: an in-process memcached speaking the text protocol
//!   over a real TCP socket
//! - `Script` / `ScriptedConnector`: an in-memory transport with canned
//!   replies that records everything written to it

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;

use mctag::network::Connector;
use mctag::{Client, ClientConfig};

// =============================================================================
// Fake Server
// =============================================================================

type Store = Arc<Mutex<HashMap<String, (u32, Vec<u8>)>>>;

/// Minimal memcached: set / get / delete, no expiry
pub struct FakeMemcached {
    addr: String,
    store: Store,
}

impl FakeMemcached {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let store: Store = Arc::default();

        let shared = Arc::clone(&store);
        thread::spawn(move || {
            for conn in listener.incoming() {
                let Ok(conn) = conn else { break };
                let store = Arc::clone(&shared);
                thread::spawn(move || {
                    let _ = serve(conn, store);
                });
            }
        });

        Self { addr, store }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn client(&self) -> Client {
        Client::for_addr(self.addr.clone()).unwrap()
    }

    pub fn client_with_chunk(&self, chunk: usize) -> Client {
        let config = ClientConfig::builder()
            .addr(self.addr.clone())
            .read_chunk_size(chunk)
            .build()
            .unwrap();
        Client::new(config)
    }

    /// Store an item directly, bypassing the client
    pub fn insert_raw(&self, key: &str, flags: u32, data: &[u8]) {
        self.store
            .lock()
            .unwrap()
            .insert(key.to_string(), (flags, data.to_vec()));
    }

    /// Send a raw command on a fresh connection and return the reply
    /// text up to and including the terminator line.
    pub fn raw(&self, command: &str) -> String {
        let mut stream = TcpStream::connect(&self.addr).unwrap();
        stream.write_all(command.as_bytes()).unwrap();
        stream.write_all(b"\r\n").unwrap();

        let mut reader = BufReader::new(stream);
        let mut reply = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }
            reply.push_str(&line);
            if matches!(
                line.trim_end(),
                "END" | "ERROR" | "STORED" | "DELETED" | "NOT_FOUND"
            ) {
                break;
            }
        }
        reply
    }
}

fn serve(conn: TcpStream, store: Store) -> io::Result<()> {
    let mut writer = conn.try_clone()?;
    let mut reader = BufReader::new(conn);

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            ["set", key, flags, _exptime, len] => {
                let len: usize = len.parse().unwrap_or(0);
                let mut data = vec![0u8; len + 2];
                reader.read_exact(&mut data)?;
                data.truncate(len);
                let flags = flags.parse().unwrap_or(0);
                store.lock().unwrap().insert(key.to_string(), (flags, data));
                writer.write_all(b"STORED\r\n")?;
            }
            ["get", keys @ ..] if !keys.is_empty() => {
                let mut out = Vec::new();
                {
                    let store = store.lock().unwrap();
                    for key in keys {
                        if let Some((flags, data)) = store.get(*key) {
                            out.extend_from_slice(
                                format!("VALUE {} {} {}\r\n", key, flags, data.len()).as_bytes(),
                            );
                            out.extend_from_slice(data);
                            out.extend_from_slice(b"\r\n");
                        }
                    }
                }
                out.extend_from_slice(b"END\r\n");
                writer.write_all(&out)?;
            }
            ["delete", key] => {
                let removed = store.lock().unwrap().remove(*key).is_some();
                let reply: &[u8] = if removed { b"DELETED\r\n" } else { b"NOT_FOUND\r\n" };
                writer.write_all(reply)?;
            }
            _ => writer.write_all(b"ERROR\r\n")?,
        }
        writer.flush()?;
    }
}

// =============================================================================
// Scripted Transport
// =============================================================================

/// One scripted read result
#[derive(Debug, Clone)]
pub enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
pub struct ScriptState {
    pub written: Vec<u8>,
    pub reads: VecDeque<Step>,
    pub opens: usize,
    pub closes: usize,
    pub refuse_open: bool,
    pub fail_writes: bool,
}

/// Handle shared between the test and the transport it scripts
#[derive(Debug, Clone, Default)]
pub struct Script(pub Rc<RefCell<ScriptState>>);

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the client to read
    pub fn reply(&self, bytes: &[u8]) -> &Self {
        self.0.borrow_mut().reads.push_back(Step::Data(bytes.to_vec()));
        self
    }

    pub fn fail_read(&self, kind: io::ErrorKind) -> &Self {
        self.0.borrow_mut().reads.push_back(Step::Fail(kind));
        self
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().written).into_owned()
    }

    pub fn clear_written(&self) {
        self.0.borrow_mut().written.clear();
    }

    pub fn opens(&self) -> usize {
        self.0.borrow().opens
    }

    pub fn closes(&self) -> usize {
        self.0.borrow().closes
    }

    pub fn client(&self) -> Client<ScriptedConnector> {
        self.client_with_chunk(4096)
    }

    pub fn client_with_chunk(&self, chunk: usize) -> Client<ScriptedConnector> {
        let config = ClientConfig::builder()
            .addr("scripted:11211")
            .read_chunk_size(chunk)
            .build()
            .unwrap();
        Client::with_connector(config, ScriptedConnector(self.clone()))
    }
}

pub struct ScriptedConnector(pub Script);

impl Connector for ScriptedConnector {
    type Stream = ScriptedTransport;

    fn open(&self, _addr: &str) -> io::Result<ScriptedTransport> {
        let mut state = self.0 .0.borrow_mut();
        if state.refuse_open {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }
        state.opens += 1;
        Ok(ScriptedTransport(self.0.clone()))
    }
}

pub struct ScriptedTransport(Script);

// Named by path so `write_all` on `TcpStream` above stays unambiguous
impl mctag::network::Transport for ScriptedTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.0 .0.borrow_mut();
        if state.fail_writes {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        state.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.0 .0.borrow_mut();
        match state.reads.pop_front() {
            None => Ok(0),
            Some(Step::Fail(kind)) => Err(io::Error::from(kind)),
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    state.reads.push_front(Step::Data(rest));
                }
                Ok(n)
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.0 .0.borrow_mut().closes += 1;
        Ok(())
    }
}
