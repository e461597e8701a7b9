//! readlater - a small web front-end for a bookmarking service's
//! "read later" queue.

use std::io;

use anyhow::{Context, Result};
use readlater_core::Config;
use readlater_web::{app, AppState};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "readlater listening");

    axum::serve(listener, app(state).layer(TraceLayer::new_for_http()))
        .await
        .context("Server error")?;

    info!("readlater shutting down");
    Ok(())
}
