//! RPC client: connects to a single URI, performs the `VERSION` handshake
//! once, and serializes subsequent calls through that one connection. No
//! auto-reconnect — a transport failure fails the call and leaves the
//! client in a state where further calls will keep failing until a new
//! `Client` is constructed.

use std::sync::Mutex;

use bytecache::{Blob, CacheFacade};

use crate::error::{Error, Result};
use crate::transport::{parse_uri, Connection, MAX_PAYLOAD_BYTES};
use crate::wire::{Frame, Param, Verb, PROTOCOL_VERSION, STATUS_OK};

/// A handle to a remote cache, reached over `bytecache-rpc`'s wire
/// protocol.
///
/// Calls are serialized through a single connection (`Mutex<Connection>`):
/// this crate does not pipeline or multiplex requests, matching the
/// source's one-outstanding-call-at-a-time client model.
#[derive(Debug)]
pub struct Client {
    connection: Mutex<Connection>,
}

impl Client {
    /// Connects to `uri` and performs the one-time `VERSION` handshake.
    /// Fails with [`Error::VersionMismatch`] if the peer's protocol version
    /// doesn't match this crate's.
    pub fn connect(uri: &str) -> Result<Self> {
        let target = parse_uri(uri)?;
        let mut connection = Connection::connect(&target)?;

        connection.send_frame(&Frame::new(Verb::Version, vec![]))?;
        let response = connection.recv_frame()?;
        let peer_version = response
            .params
            .first()
            .ok_or_else(|| Error::MalformedFrame("VERSION response missing version param".into()))?
            .as_u32()?;
        if peer_version != PROTOCOL_VERSION {
            return Err(Error::VersionMismatch {
                local: PROTOCOL_VERSION,
                peer: peer_version,
            });
        }

        Ok(Client {
            connection: Mutex::new(connection),
        })
    }

    fn call(&self, frame: Frame) -> Result<Frame> {
        let mut connection = self
            .connection
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        connection.send_frame(&frame)?;
        connection.recv_frame()
    }
}

impl CacheFacade for Client {
    fn store(&self, key: u64, detail: u64, a: &[u8], b: &[u8]) -> bool {
        if a.len() + b.len() > MAX_PAYLOAD_BYTES {
            return false;
        }
        let mut data = Vec::with_capacity(a.len() + b.len());
        data.extend_from_slice(a);
        data.extend_from_slice(b);

        let request = Frame::new(
            Verb::Set,
            vec![Param::U64(key), Param::U64(detail), Param::Bytes(data)],
        );
        match self.call(request) {
            Ok(response) => response
                .params
                .first()
                .and_then(|p| p.as_u32().ok())
                .map(|status| status == STATUS_OK)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn load(&self, key: u64, detail: u64) -> Option<Vec<u8>> {
        let request = Frame::new(Verb::Get, vec![Param::U64(key), Param::U64(detail)]);
        let response = self.call(request).ok()?;
        let status = response.params.first()?.as_u32().ok()?;
        if status != STATUS_OK {
            return None;
        }
        let data = response.params.get(1)?.as_bytes().ok()?;
        Some(data.to_vec())
    }

    fn load_split(
        &self,
        key: u64,
        detail: u64,
        prefix_size: usize,
        out_a: Option<&mut Blob<'_>>,
        out_b: Option<&mut Blob<'_>>,
    ) -> bool {
        let Some(out_a) = out_a else {
            return false;
        };
        let Some(payload) = self.load(key, detail) else {
            return false;
        };
        let m_a = prefix_size.min(payload.len());
        out_a.copy_from(&payload[..m_a]);
        if let Some(out_b) = out_b {
            out_b.copy_from(&payload[m_a..]);
        }
        true
    }
}
