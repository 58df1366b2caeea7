//! usuarios server entry point.
//!
//! Error boundary for the binary: failures are reported with their full
//! chain and the process exits with status 1.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use usuarios::{Config, Server, UserDirectory};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let addr = config.addr().await?;

    let directory = UserDirectory::seeded();
    info!(users = directory.len(), public_dir = %config.public_dir.display(), "directory seeded");

    let app = usuarios::app(directory.shared(), config.public_dir);
    let server = Server::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    server.serve(app).await.context("server error")?;
    Ok(())
}
