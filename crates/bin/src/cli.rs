//! CLI argument definitions for the identd binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// In-memory with JSON persistence
    Inmemory,
}

/// identd user registration and session server
#[derive(Parser, Debug)]
#[command(name = "identd")]
#[command(about = "identd: usernames, passwords and session tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the identd server
    Serve(ServeArgs),
    /// Check health of a running identd server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "IDENTD_HOST")]
    pub host: String,

    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "IDENTD_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores identd.db
    /// For InMemory: stores identd.json
    #[arg(short = 'D', long, default_value = ".", env = "IDENTD_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, env = "IDENTD_REQUEST_TIMEOUT")]
    pub request_timeout: u64,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
