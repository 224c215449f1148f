//! Worker-pool RPC server.
//!
//! The server binds one transport listener and a fixed-size pool of worker
//! threads (§6.2's "worker-thread count, clamped to a transport maximum").
//! Accepted connections are handed to workers over a bounded channel sized
//! to `max_clients`; a worker serves one connection to completion (looping
//! on `recv_frame`/`send_frame` until the peer disconnects or a frame is
//! malformed) before picking up the next one. Each worker keeps a scratch
//! buffer across the connections it serves, reused as the backing store for
//! `GET` responses to avoid a fresh allocation on every hit.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use bytecache::CacheFacade;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::transport::{parse_uri, Connection, Listener};
use crate::wire::{Frame, Param, Verb, PROTOCOL_VERSION, STATUS_FAIL, STATUS_OK};

/// A bound RPC server fronting a cache facade.
///
/// `F` is almost always `bytecache::Engine`, but any `CacheFacade`
/// implementation works — including, notably, another `Client`, for
/// building a proxy.
pub struct Server<F> {
    cache: Arc<F>,
    listener: Listener,
    worker_threads: usize,
    max_clients: usize,
}

impl<F: CacheFacade + Send + Sync + 'static> Server<F> {
    /// Binds `config.listen` and prepares to dispatch onto `cache`. Does
    /// not start accepting connections yet; call [`Server::run`].
    pub fn bind(config: &ServerConfig, cache: F) -> Result<Self> {
        let target = parse_uri(&config.listen)?;
        let listener = Listener::bind(&target)?;
        tracing::info!(listen = %config.listen, workers = config.worker_threads, "server bound");
        Ok(Server {
            cache: Arc::new(cache),
            listener,
            worker_threads: config.worker_threads,
            max_clients: config.max_clients,
        })
    }

    /// Runs the accept loop forever, dispatching connections to the worker
    /// pool. Returns only on a fatal listener error.
    pub fn run(self) -> Result<()> {
        let (tx, rx) = mpsc::sync_channel::<Connection>(self.max_clients);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(self.worker_threads);
        for id in 0..self.worker_threads {
            let rx = Arc::clone(&rx);
            let cache = Arc::clone(&self.cache);
            workers.push(thread::spawn(move || worker_loop(id, rx, cache)));
        }

        loop {
            match self.listener.accept() {
                Ok(connection) => {
                    if tx.send(connection).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed");
                }
            }
        }

        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }
        Ok(())
    }
}

fn worker_loop<F: CacheFacade + Send + Sync>(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Connection>>>,
    cache: Arc<F>,
) {
    // Reused across every connection this worker serves; `GET` responses
    // are built into it rather than a fresh `Vec` per call.
    let mut scratch: Vec<u8> = Vec::new();
    loop {
        let next = {
            let guard = rx.lock().unwrap_or_else(|poison| poison.into_inner());
            guard.recv()
        };
        let Ok(mut connection) = next else {
            break;
        };
        tracing::debug!(worker = id, "serving connection");
        serve_connection(&mut connection, cache.as_ref(), &mut scratch);
    }
}

fn serve_connection<F: CacheFacade>(connection: &mut Connection, cache: &F, scratch: &mut Vec<u8>) {
    loop {
        let frame = match connection.recv_frame() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(error = %err, "connection closed");
                return;
            }
        };
        let response = dispatch(&frame, cache, scratch);
        if let Err(err) = connection.send_frame(&response) {
            tracing::warn!(error = %err, "failed to send response");
            return;
        }
    }
}

fn dispatch<F: CacheFacade>(frame: &Frame, cache: &F, scratch: &mut Vec<u8>) -> Frame {
    match frame.verb {
        Verb::Version => Frame::new(Verb::Version, vec![Param::U32(PROTOCOL_VERSION)]),
        Verb::Set => handle_set(frame, cache),
        Verb::Get => handle_get(frame, cache, scratch),
    }
}

fn handle_set<F: CacheFacade>(frame: &Frame, cache: &F) -> Frame {
    let status = (|| -> Option<bool> {
        let key = frame.params.first()?.as_u64().ok()?;
        let detail = frame.params.get(1)?.as_u64().ok()?;
        let data = frame.params.get(2)?.as_bytes().ok()?;
        Some(cache.store(key, detail, data, &[]))
    })()
    .unwrap_or(false);

    let code = if status { STATUS_OK } else { STATUS_FAIL };
    Frame::new(Verb::Set, vec![Param::U32(code)])
}

fn handle_get<F: CacheFacade>(frame: &Frame, cache: &F, scratch: &mut Vec<u8>) -> Frame {
    let request = (|| -> Option<(u64, u64)> {
        let key = frame.params.first()?.as_u64().ok()?;
        let detail = frame.params.get(1)?.as_u64().ok()?;
        Some((key, detail))
    })();

    let Some((key, detail)) = request else {
        return Frame::new(Verb::Get, vec![Param::U32(STATUS_FAIL)]);
    };

    match cache.load(key, detail) {
        Some(payload) => {
            scratch.clear();
            scratch.extend_from_slice(&payload);
            let data = std::mem::take(scratch);
            Frame::new(
                Verb::Get,
                vec![Param::U32(STATUS_OK), Param::Bytes(data)],
            )
        }
        None => Frame::new(Verb::Get, vec![Param::U32(STATUS_FAIL)]),
    }
}
