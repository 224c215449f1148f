//! Command-line client for a `bytecache-rpc` server: `set`, `get`, `delete`.

use clap::{Parser, Subcommand};

use bytecache::CacheFacade;
use bytecache_rpc::Client;

/// Talk to a bytecache RPC server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server URI to connect to (`shm://name` or `tcp://host:port`).
    #[arg(short, long)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

/// Subcommands mirroring the wire protocol's verb set.
#[derive(Subcommand, Debug)]
enum Command {
    /// Store a value under a numeric key and detail.
    Set {
        /// Cache key.
        key: u64,
        /// Cache detail (secondary dimension of the key).
        #[arg(default_value_t = 0)]
        detail: u64,
        /// Value to store, read as UTF-8 bytes from the argument.
        value: String,
    },
    /// Load a value by numeric key and detail.
    Get {
        /// Cache key.
        key: u64,
        /// Cache detail (secondary dimension of the key).
        #[arg(default_value_t = 0)]
        detail: u64,
    },
    /// Delete all details stored under a key.
    Delete {
        /// Cache key.
        key: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = Client::connect(&args.server)?;

    match args.command {
        Command::Set { key, detail, value } => {
            let ok = client.store(key, detail, value.as_bytes(), b"");
            if ok {
                println!("OK");
            } else {
                println!("REJECTED");
                std::process::exit(1);
            }
        }
        Command::Get { key, detail } => match client.load(key, detail) {
            Some(data) => println!("{}", String::from_utf8_lossy(&data)),
            None => {
                println!("MISS");
                std::process::exit(1);
            }
        },
        Command::Delete { key } => {
            let ok = client.delete(key);
            if ok {
                println!("OK");
            } else {
                println!("REJECTED");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
