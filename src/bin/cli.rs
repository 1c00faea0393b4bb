//! mctag CLI Client
//!
//! Command-line interface for storing and fetching typed values.

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use mctag::{Client, ClientConfig, Fetched, McError, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// mctag CLI
#[derive(Parser, Debug)]
#[command(name = "mctag-cli")]
#[command(about = "CLI for a memcached server with typed values")]
#[command(version)]
struct Args {
    /// Server address (defaults to MEMCACHED_ADDR / MEMCACHED_HOST, then 127.0.0.1:11211)
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get one or more values
    Get {
        /// Keys to fetch
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// How to interpret VALUE
        #[arg(short, long, value_enum, default_value_t = Kind::String)]
        kind: Kind,

        /// Lifetime in seconds
        #[arg(short, long, default_value = "3600")]
        ttl: u32,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Int,
    Float,
    Bool,
    String,
    Json,
    Null,
}

fn parse_value(raw: &str, kind: Kind) -> Result<Value, String> {
    match kind {
        Kind::Int => raw.parse::<i64>().map(Value::Int).map_err(|e| e.to_string()),
        Kind::Float => raw.parse::<f64>().map(Value::Float).map_err(|e| e.to_string()),
        Kind::Bool => match raw {
            "1" | "true" | "yes" => Ok(Value::Bool(true)),
            "0" | "false" | "no" | "" => Ok(Value::Bool(false)),
            other => Err(format!("not a boolean: {}", other)),
        },
        Kind::String => Ok(Value::Text(raw.to_string())),
        Kind::Json => serde_json::from_str::<Value>(raw).map_err(|e| e.to_string()),
        Kind::Null => Ok(Value::Null),
    }
}

fn run(args: Args) -> Result<(), McError> {
    let config = match args.server {
        Some(addr) => ClientConfig::builder().addr(addr).build()?,
        None => ClientConfig::from_env(),
    };
    tracing::info!("Using server {}", config.addr);

    let mut client = Client::new(config);

    match args.command {
        Commands::Get { keys } => match client.get_value(&keys.join(" "))? {
            Fetched::Hit(value) => println!("{}", value),
            Fetched::Multi(values) => {
                for (key, value) in values {
                    println!("{}\t{}", key, value);
                }
            }
            Fetched::Miss | Fetched::Rejected => println!("(nil)"),
        },
        Commands::Set { key, value, kind, ttl } => {
            let value = parse_value(&value, kind).map_err(McError::InvalidArgument)?;
            let stored = client.set_value_for(&key, value, ttl)?;
            println!("{}", if stored { "STORED" } else { "NOT_STORED" });
        }
        Commands::Del { key } => {
            let deleted = client.del_value(&key)?;
            println!("{}", if deleted { "DELETED" } else { "NOT_FOUND" });
        }
    }

    client.close()
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mctag=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
