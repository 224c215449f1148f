//! Error type for failures that happen before (or around) the engine's own
//! boolean success/rejection/miss trichotomy: things that keep a client or
//! server from ever reaching a call.

use std::io;

/// Failures specific to the RPC layer: configuration, transport setup, and
/// protocol framing. Engine-level outcomes (rejection, miss) are still
/// booleans, surfaced through [`crate::CacheFacade`] — they never appear
/// here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The URI did not start with a scheme this crate understands
    /// (`shm://` or `tcp://`).
    #[error("unsupported transport scheme in URI: {0}")]
    UnsupportedScheme(String),

    /// A `tcp://` URI was missing the `host:port` part, or it didn't
    /// parse as a socket address.
    #[error("invalid tcp address in URI: {0}")]
    InvalidAddress(String),

    /// No channel registered under this `shm://` name (client connected to
    /// a name no server has bound).
    #[error("no shared-memory channel named {0:?}")]
    UnknownChannel(String),

    /// The peer's `VERSION` response did not match
    /// [`crate::wire::PROTOCOL_VERSION`]. The client refuses to proceed.
    #[error("protocol version mismatch: local {local}, peer {peer}")]
    VersionMismatch {
        /// This crate's protocol version.
        local: u32,
        /// The version advertised by the peer.
        peer: u32,
    },

    /// A request or response frame was malformed (wrong tag, truncated
    /// length-prefixed field, etc.).
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A request's payload length exceeded [`crate::transport::MAX_DATA_SIZE`]
    /// minus the header reserve.
    #[error("payload of {actual} bytes exceeds the transport limit of {limit} bytes")]
    PayloadTooLarge {
        /// The payload size that was rejected.
        actual: usize,
        /// The effective limit (`MAX_DATA_SIZE` minus header reserve).
        limit: usize,
    },

    /// Underlying transport I/O failure (connect, accept, read, write).
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// Server configuration failed to load or did not pass validation.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_stable_message(err: Error, expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn unsupported_scheme_message_is_stable() {
        assert_stable_message(
            Error::UnsupportedScheme("http://x".to_string()),
            "unsupported transport scheme in URI: http://x",
        );
    }

    #[test]
    fn invalid_address_message_is_stable() {
        assert_stable_message(
            Error::InvalidAddress("tcp://".to_string()),
            "invalid tcp address in URI: tcp://",
        );
    }

    #[test]
    fn unknown_channel_message_is_stable() {
        assert_stable_message(
            Error::UnknownChannel("nope".to_string()),
            "no shared-memory channel named \"nope\"",
        );
    }

    #[test]
    fn version_mismatch_message_is_stable() {
        assert_stable_message(
            Error::VersionMismatch { local: 2, peer: 1 },
            "protocol version mismatch: local 2, peer 1",
        );
    }

    #[test]
    fn malformed_frame_message_is_stable() {
        assert_stable_message(
            Error::MalformedFrame("truncated".to_string()),
            "malformed frame: truncated",
        );
    }

    #[test]
    fn payload_too_large_message_is_stable() {
        assert_stable_message(
            Error::PayloadTooLarge {
                actual: 100,
                limit: 10,
            },
            "payload of 100 bytes exceeds the transport limit of 10 bytes",
        );
    }

    #[test]
    fn io_message_is_non_empty() {
        let err = Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn config_message_is_non_empty() {
        let path = std::env::temp_dir().join(format!(
            "bytecache-rpc-error-test-{:?}.toml",
            std::thread::current().id()
        ));
        std::fs::write(&path, "this is not valid toml = = =").unwrap();
        let err = crate::config::ServerConfig::load(&path).expect_err("malformed toml should fail to load");
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, Error::Config(_)));
        assert!(!err.to_string().is_empty());
    }
}
