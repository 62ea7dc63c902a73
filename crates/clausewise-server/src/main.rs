//! Clausewise Server
//!
//! Starts the HTTP server that backs the browser extension.

use anyhow::Context;
use clap::Parser;
use clausewise_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Terms and Conditions analysis server
#[derive(Debug, Parser)]
#[command(name = "clausewise-server", version, about)]
struct Args {
    /// Load configuration from a TOML file
    #[arg(long, env = "CLAUSEWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on; overrides the config file and PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // .env is optional
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    start_server(config).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
