//! Holdfast registry server.
//!
//! Run:
//!   cargo run -p holdfast-server -- --bootstrap local:admin --port 8040
//!
//! Then:
//!   curl -X POST localhost:8040/assets -H 'x-principal: local:admin' \
//!        -H 'content-type: application/json' -d '{"metadata_uri":"ipfs://deed"}'
//!   curl localhost:8040/assets/1

mod config;
mod protocol;
mod server;

use clap::Parser;
use config::{Config, ConfigFile, Overrides};
use holdfast_core::Principal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Asset ownership registry server")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "HOLDFAST_CONFIG")]
    config: Option<PathBuf>,
    /// Port to listen on.
    #[arg(long, env = "HOLDFAST_PORT")]
    port: Option<u16>,
    /// Principal that receives Admin and User at startup.
    #[arg(long, env = "HOLDFAST_BOOTSTRAP")]
    bootstrap: Option<Principal>,
    /// Registry name reported in the manifest.
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("holdfast=info".parse()?))
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => ConfigFile::from_path(path)?,
        None => ConfigFile::default(),
    };
    let config = Config::resolve(
        file,
        Overrides {
            name: cli.name,
            port: cli.port,
            bootstrap: cli.bootstrap,
        },
    )?;

    tracing::info!(
        "Starting '{}' on port {} (bootstrap {})",
        config.name,
        config.port,
        config.bootstrap
    );

    server::run(config).await
}
