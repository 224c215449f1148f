//! Wire framing: verbs, status codes, and the request/response frame shapes
//! both transports (`shm://` and `tcp://`) carry verbatim.
//!
//! A frame is a verb tag, a parameter count, and that many `(tag, len,
//! bytes)` parameters — a generalization of the source's fixed uRPC
//! parameter slots into a small, explicit encode/decode pair. Parameter
//! values are always one of two shapes: a 4-byte little-endian integer (for
//! `key`, `detail`, `status`, `version`) or a length-prefixed byte string
//! (for `data`); [`Param`] carries that distinction so callers don't have to
//! remember which verb uses which.

use crate::error::{Error, Result};

/// Protocol version this crate speaks. Carried over unchanged from the
/// source this protocol distills; bumping it is a wire break.
pub const PROTOCOL_VERSION: u32 = 20_151_200;

/// Status code meaning the call completed and the engine reported success.
pub const STATUS_OK: u32 = 1;
/// Status code meaning rejection, miss, or transport-level failure — the
/// wire protocol does not distinguish these, matching the façade's boolean
/// contract.
pub const STATUS_FAIL: u32 = 0;

/// RPC procedure identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Handshake: no parameters, responds with this crate's protocol
    /// version.
    Version,
    /// Store (or, with empty data, delete) a key.
    Set,
    /// Load a key's payload.
    Get,
}

impl Verb {
    fn tag(self) -> u32 {
        match self {
            Verb::Version => 0,
            Verb::Set => 1,
            Verb::Get => 2,
        }
    }

    fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(Verb::Version),
            1 => Ok(Verb::Set),
            2 => Ok(Verb::Get),
            other => Err(Error::MalformedFrame(format!("unknown verb tag {other}"))),
        }
    }
}

/// One request or response parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A 4-byte unsigned integer (`key`, `detail`, `status`, `version`).
    U32(u32),
    /// An 8-byte unsigned integer (`key`, `detail`).
    U64(u64),
    /// A length-prefixed byte string (`data`).
    Bytes(Vec<u8>),
}

impl Param {
    const KIND_U32: u32 = 0;
    const KIND_BYTES: u32 = 1;
    const KIND_U64: u32 = 2;

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Param::U32(v) => {
                out.extend_from_slice(&Self::KIND_U32.to_le_bytes());
                out.extend_from_slice(&4u32.to_le_bytes());
                out.extend_from_slice(&v.to_le_bytes());
            }
            Param::U64(v) => {
                out.extend_from_slice(&Self::KIND_U64.to_le_bytes());
                out.extend_from_slice(&8u32.to_le_bytes());
                out.extend_from_slice(&v.to_le_bytes());
            }
            Param::Bytes(data) => {
                out.extend_from_slice(&Self::KIND_BYTES.to_le_bytes());
                out.extend_from_slice(&(data.len() as u32).to_le_bytes());
                out.extend_from_slice(data);
            }
        }
    }

    fn decode(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let kind = read_u32(buf, pos)?;
        let len = read_u32(buf, pos)? as usize;
        if *pos + len > buf.len() {
            return Err(Error::MalformedFrame("parameter length overruns frame".into()));
        }
        let bytes = &buf[*pos..*pos + len];
        *pos += len;
        match kind {
            Self::KIND_U32 => {
                if len != 4 {
                    return Err(Error::MalformedFrame("u32 parameter of wrong length".into()));
                }
                let mut b = [0u8; 4];
                b.copy_from_slice(bytes);
                Ok(Param::U32(u32::from_le_bytes(b)))
            }
            Self::KIND_U64 => {
                if len != 8 {
                    return Err(Error::MalformedFrame("u64 parameter of wrong length".into()));
                }
                let mut b = [0u8; 8];
                b.copy_from_slice(bytes);
                Ok(Param::U64(u64::from_le_bytes(b)))
            }
            Self::KIND_BYTES => Ok(Param::Bytes(bytes.to_vec())),
            other => Err(Error::MalformedFrame(format!("unknown parameter kind {other}"))),
        }
    }

    /// Unwraps a [`Param::U32`], or a malformed-frame error.
    pub fn as_u32(&self) -> Result<u32> {
        match self {
            Param::U32(v) => Ok(*v),
            _ => Err(Error::MalformedFrame("expected u32 parameter".into())),
        }
    }

    /// Unwraps a [`Param::U64`], or a malformed-frame error.
    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Param::U64(v) => Ok(*v),
            _ => Err(Error::MalformedFrame("expected u64 parameter".into())),
        }
    }

    /// Unwraps a [`Param::Bytes`], or a malformed-frame error.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Param::Bytes(b) => Ok(b),
            _ => Err(Error::MalformedFrame("expected bytes parameter".into())),
        }
    }
}

/// A complete verb plus its ordered parameters — one wire frame, request or
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which procedure this frame is for.
    pub verb: Verb,
    /// Ordered parameters; callers on both ends agree on the order per
    /// verb (see the tables in `bytecache_rpc`'s crate docs).
    pub params: Vec<Param>,
}

impl Frame {
    /// Builds a frame.
    pub fn new(verb: Verb, params: Vec<Param>) -> Self {
        Frame { verb, params }
    }

    /// Encodes this frame as `verb tag (u32) | param count (u32) |
    /// params...`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.params.len() * 16);
        out.extend_from_slice(&self.verb.tag().to_le_bytes());
        out.extend_from_slice(&(self.params.len() as u32).to_le_bytes());
        for param in &self.params {
            param.encode(&mut out);
        }
        out
    }

    /// Decodes a frame previously produced by [`Frame::encode`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut pos = 0usize;
        let verb = Verb::from_tag(read_u32(buf, &mut pos)?)?;
        let count = read_u32(buf, &mut pos)? as usize;
        let mut params = Vec::with_capacity(count);
        for _ in 0..count {
            params.push(Param::decode(buf, &mut pos)?);
        }
        Ok(Frame { verb, params })
    }
}

fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32> {
    if *pos + 4 > buf.len() {
        return Err(Error::MalformedFrame("frame truncated".into()));
    }
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[*pos..*pos + 4]);
    *pos += 4;
    Ok(u32::from_le_bytes(b))
}
