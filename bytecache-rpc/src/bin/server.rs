//! Stand up a `bytecache-rpc` server fronting an in-process engine.

use std::path::PathBuf;

use clap::Parser;

use bytecache::config::EngineConfig;
use bytecache::Engine;
use bytecache_rpc::{Server, ServerConfig};

/// Run a bytecache RPC server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file, overlaid with `BYTECACHE_`-prefixed
    /// environment variables. Falls back to built-in defaults for anything
    /// neither source sets.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Transport URI to bind (`shm://name` or `tcp://host:port`), overriding
    /// the config file.
    #[arg(short, long)]
    listen: Option<String>,

    /// Cache budget in megabytes, overriding the config file.
    #[arg(long)]
    capacity_mb: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default().clamped(),
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(capacity_mb) = args.capacity_mb {
        config.capacity_mb = capacity_mb;
    }

    let cache = Engine::new(EngineConfig::new(config.capacity_mb));
    tracing::info!(
        listen = %config.listen,
        capacity_mb = config.capacity_mb,
        workers = config.worker_threads,
        "starting bytecache-server"
    );

    let server = Server::bind(&config, cache)?;
    server.run()?;
    Ok(())
}
