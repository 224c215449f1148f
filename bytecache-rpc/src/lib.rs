//! RPC server and client for [`bytecache`](https://docs.rs/bytecache): a
//! request/response protocol, framed over either an in-process
//! shared-memory-style channel (`shm://name`) or a TCP socket
//! (`tcp://host:port`), exposing the same `VERSION`/`SET`/`GET` verb set the
//! source protocol this crate distills defines.
//!
//! - [`wire`] — verb tags, status codes, and the frame encode/decode pair.
//! - [`transport`] — URI parsing and the two transport implementations.
//! - [`server`] — a worker-pool server dispatching verbs onto a
//!   [`bytecache::CacheFacade`].
//! - [`client`] — [`Client`], which implements `CacheFacade` itself by
//!   round-tripping calls to a server.
//! - [`config`] — server configuration (file + environment overlay).
//! - [`error`] — this crate's typed error enum.

/// Wire framing: verbs, status codes, request/response frame shapes.
pub mod wire;

/// Transport selection (`shm://`, `tcp://`) and connection plumbing.
pub mod transport;

/// Server-side configuration loading.
pub mod config;

/// This crate's error type.
pub mod error;

/// The RPC client, implementing [`bytecache::CacheFacade`].
pub mod client;

/// The RPC server: worker pool dispatching verbs onto a cache facade.
pub mod server;

pub use client::Client;
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use server::Server;
