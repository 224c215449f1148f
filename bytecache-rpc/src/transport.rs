//! Transports: `shm://name` (an in-process named channel registry standing
//! in for real shared memory) and `tcp://host:port` (real sockets).
//!
//! Both carry the same [`crate::wire::Frame`] request/response shape; only
//! the byte-level framing differs. `shm://` messages are already
//! discrete (an `mpsc` channel preserves message boundaries), so no extra
//! length prefix is needed. `tcp://` is a raw byte stream, so each frame is
//! additionally wrapped in a `u32` length prefix.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};

use crate::error::{Error, Result};
use crate::wire::Frame;

/// Per-request transport cap, exclusive of the header reserve. Blobs larger
/// than `MAX_DATA_SIZE - HEADER_RESERVE_BYTES` cannot be stored over RPC.
pub const MAX_DATA_SIZE: usize = 32 * 1024 * 1024;

/// Bytes reserved for verb/parameter framing overhead, subtracted from
/// [`MAX_DATA_SIZE`] to get the effective payload ceiling.
pub const HEADER_RESERVE_BYTES: usize = 1024;

/// The largest `data` payload a single request or response may carry.
pub const MAX_PAYLOAD_BYTES: usize = MAX_DATA_SIZE - HEADER_RESERVE_BYTES;

/// A parsed connection target, from either a `shm://` or `tcp://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `shm://name`
    Shm(String),
    /// `tcp://host:port`, already resolved.
    Tcp(SocketAddr),
}

/// Parses a `shm://name` or `tcp://host:port` connection URI.
pub fn parse_uri(uri: &str) -> Result<Target> {
    if let Some(name) = uri.strip_prefix("shm://") {
        if name.is_empty() {
            return Err(Error::InvalidAddress(uri.to_string()));
        }
        return Ok(Target::Shm(name.to_string()));
    }
    if let Some(addr) = uri.strip_prefix("tcp://") {
        let resolved = addr
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress(uri.to_string()))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(uri.to_string()))?;
        return Ok(Target::Tcp(resolved));
    }
    Err(Error::UnsupportedScheme(uri.to_string()))
}

fn registry() -> &'static Mutex<HashMap<String, mpsc::Sender<ShmChannel>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, mpsc::Sender<ShmChannel>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// One end of an in-process duplex channel standing in for a shared-memory
/// connection. Each accepted client gets its own pair of `mpsc` channels;
/// frames are sent as already-discrete byte vectors, so no length prefix is
/// needed.
#[derive(Debug)]
pub struct ShmChannel {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ShmChannel {
    fn send_raw(&self, bytes: Vec<u8>) -> Result<()> {
        self.tx
            .send(bytes)
            .map_err(|_| Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "shm peer gone")))
    }

    fn recv_raw(&self) -> Result<Vec<u8>> {
        self.rx
            .recv()
            .map_err(|_| Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "shm peer gone")))
    }
}

/// The server side of a bound `shm://name` channel: accepts incoming client
/// connections one at a time, the way [`TcpListener::accept`] does.
#[derive(Debug)]
pub struct ShmListener {
    rx: mpsc::Receiver<ShmChannel>,
}

impl ShmListener {
    /// Blocks until a client connects, returning the server-side channel.
    pub fn accept(&self) -> Result<ShmChannel> {
        self.rx
            .recv()
            .map_err(|_| Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "no more shm clients")))
    }
}

/// Registers `name` in the process-wide channel registry and returns a
/// listener for it. Re-binding an already-bound name replaces the previous
/// registration (any in-flight listener for the old registration simply
/// stops receiving new clients).
pub fn bind_shm(name: &str) -> Result<ShmListener> {
    let (tx, rx) = mpsc::channel();
    registry()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .insert(name.to_string(), tx);
    Ok(ShmListener { rx })
}

/// Connects to a channel previously bound with [`bind_shm`].
pub fn connect_shm(name: &str) -> Result<ShmChannel> {
    let sender = registry()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownChannel(name.to_string()))?;

    let (client_tx, server_rx) = mpsc::channel();
    let (server_tx, client_rx) = mpsc::channel();
    let server_side = ShmChannel {
        tx: server_tx,
        rx: server_rx,
    };
    sender
        .send(server_side)
        .map_err(|_| Error::UnknownChannel(name.to_string()))?;
    Ok(ShmChannel {
        tx: client_tx,
        rx: client_rx,
    })
}

fn write_length_prefixed(stream: &mut TcpStream, bytes: &[u8]) -> Result<()> {
    stream.write_all(&(bytes.len() as u32).to_le_bytes())?;
    stream.write_all(bytes)?;
    Ok(())
}

fn read_length_prefixed(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_DATA_SIZE {
        return Err(Error::PayloadTooLarge {
            actual: len,
            limit: MAX_DATA_SIZE,
        });
    }
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

/// A live, bidirectional connection over either transport, hiding the
/// framing difference behind a uniform `send_frame`/`recv_frame` pair.
#[derive(Debug)]
pub enum Connection {
    /// `shm://` side.
    Shm(ShmChannel),
    /// `tcp://` side.
    Tcp(TcpStream),
}

impl Connection {
    /// Connects to `target`, the result of [`parse_uri`].
    pub fn connect(target: &Target) -> Result<Self> {
        match target {
            Target::Shm(name) => Ok(Connection::Shm(connect_shm(name)?)),
            Target::Tcp(addr) => Ok(Connection::Tcp(TcpStream::connect(addr)?)),
        }
    }

    /// Sends a frame over this connection.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.encode();
        match self {
            Connection::Shm(channel) => channel.send_raw(bytes),
            Connection::Tcp(stream) => write_length_prefixed(stream, &bytes),
        }
    }

    /// Receives and decodes the next frame from this connection.
    pub fn recv_frame(&mut self) -> Result<Frame> {
        let bytes = match self {
            Connection::Shm(channel) => channel.recv_raw()?,
            Connection::Tcp(stream) => read_length_prefixed(stream)?,
        };
        Frame::decode(&bytes)
    }
}

/// A bound server-side listener over either transport.
#[derive(Debug)]
pub enum Listener {
    /// `shm://` side.
    Shm(ShmListener),
    /// `tcp://` side.
    Tcp(TcpListener),
}

impl Listener {
    /// Binds `target` for accepting incoming connections.
    pub fn bind(target: &Target) -> Result<Self> {
        match target {
            Target::Shm(name) => Ok(Listener::Shm(bind_shm(name)?)),
            Target::Tcp(addr) => Ok(Listener::Tcp(TcpListener::bind(addr)?)),
        }
    }

    /// Blocks until the next client connects.
    pub fn accept(&self) -> Result<Connection> {
        match self {
            Listener::Shm(listener) => Ok(Connection::Shm(listener.accept()?)),
            Listener::Tcp(listener) => {
                let (stream, _addr) = listener.accept()?;
                Ok(Connection::Tcp(stream))
            }
        }
    }
}
