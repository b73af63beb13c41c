//! Gallery Gateway - serves photo albums stored in an object storage bucket
//!
//! Albums and the bucket they live in are read from a TOML config file. Each
//! album keeps its own cached listing of the bucket, so page loads only go to
//! the bucket on a cold start or once a listing has gone stale.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod config;
mod http_server;
mod process;
mod state;

pub use config::GalleryConfig;
pub use state::State as GalleryState;

/// Gallery Gateway - serves photo albums stored in an object storage bucket
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the gallery config file
    #[arg(short, long, default_value = "gallery.toml")]
    config: PathBuf,

    /// Address to listen on for HTTP requests
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let _guard = process::init_tracing(log_level);
    process::register_panic_logger();
    process::report_build_info();

    let config = GalleryConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let state = match GalleryState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create gallery state: {}", e);
            std::process::exit(3);
        }
    };
    tracing::info!(albums = state.albums().len(), "Gallery state ready");

    let (shutdown_handle, shutdown_rx) = process::graceful_shutdown_blocker()?;

    let listen_addr = SocketAddr::new(args.host, args.port);
    let http_config = http_server::Config::new(listen_addr, log_level);
    let server_handle = tokio::spawn(http_server::run(http_config, state, shutdown_rx));

    let served = server_handle.await;
    // the server can also stop on its own, e.g. if the listener fails to bind
    shutdown_handle.abort();

    served
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;

    tracing::info!("Gallery shutdown complete");
    Ok(())
}
