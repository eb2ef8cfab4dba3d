use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use files_server::BackendKind;

#[derive(Parser)]
#[command(
    name = "files-api",
    about = "Files API: upload, fetch, and page through files in an object-store bucket",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the resolved configuration
    Config(ConfigArgs),
}

/// Settings shared by every subcommand that resolves a configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigSource {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Bucket to serve (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,
    /// Object store backend
    #[arg(long, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse().map_err(|e: files_server::ServerError| e.to_string())
}
