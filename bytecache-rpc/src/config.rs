//! Server configuration: a config file overlaid with environment variables,
//! the way the source's sibling tools load settings — `figment` layering a
//! TOML file under a prefixed env provider.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Smallest accepted worker-thread count.
pub const MIN_WORKER_THREADS: usize = 1;
/// Largest accepted worker-thread count.
pub const MAX_WORKER_THREADS: usize = 256;

/// Smallest accepted concurrent-client cap.
pub const MIN_MAX_CLIENTS: usize = 1;
/// Largest accepted concurrent-client cap.
pub const MAX_MAX_CLIENTS: usize = 1000;

/// Server-side configuration: the listen URI, engine sizing, and worker
/// pool shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport URI to bind (`shm://name` or `tcp://host:port`).
    pub listen: String,
    /// Cache budget in megabytes, passed through to
    /// [`bytecache::EngineConfig::new`] (which clamps it further).
    pub capacity_mb: u32,
    /// Worker-thread count, clamped to `[MIN_WORKER_THREADS, MAX_WORKER_THREADS]`.
    pub worker_threads: usize,
    /// Maximum concurrent clients, clamped to `[MIN_MAX_CLIENTS, MAX_MAX_CLIENTS]`.
    pub max_clients: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: "tcp://127.0.0.1:9595".to_string(),
            capacity_mb: 64,
            worker_threads: 4,
            max_clients: 1000,
        }
    }
}

impl ServerConfig {
    /// Clamps `worker_threads` and `max_clients` into their documented
    /// ranges. Called automatically by [`ServerConfig::load`]; exposed so
    /// callers constructing a `ServerConfig` by hand (tests, embedders) get
    /// the same guarantee.
    pub fn clamped(mut self) -> Self {
        self.worker_threads = self
            .worker_threads
            .clamp(MIN_WORKER_THREADS, MAX_WORKER_THREADS);
        self.max_clients = self.max_clients.clamp(MIN_MAX_CLIENTS, MAX_MAX_CLIENTS);
        self
    }

    /// Loads configuration from `path` (TOML), overlaid with `BYTECACHE_`-
    /// prefixed environment variables (e.g. `BYTECACHE_CAPACITY_MB=128`),
    /// falling back to [`ServerConfig::default`] for anything neither
    /// source sets.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: ServerConfig = Figment::new()
            .merge(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("BYTECACHE_"))
            .extract()?;
        Ok(config.clamped())
    }
}
