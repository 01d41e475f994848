//! Crossline tile server: runs the crossing-distance analysis over
//! GeoJSON sources and serves the result as Mapbox vector tiles.

mod config;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crossline_core::prelude::GeoJsonStore;

use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(version, about = "Distance-to-crossing vector tile server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "crossline.toml")]
    config: PathBuf,

    /// Listen address, overriding the configuration file.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?;
    let listen = args.listen.unwrap_or(config.server.listen);

    let store = GeoJsonStore::from_paths(
        &config.data.crossing_points,
        &config.data.crossing_ways,
        &config.data.roads,
    )?;
    let state = AppState::new(Arc::new(store), config.analysis);

    tracing::info!("running initial analysis");
    state.rebuild().await?;

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("listening on {listen}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install ctrl-c handler: {e}");
    }
}
