//! Aquamark Web - HTTP service for watermarking PDF documents.

mod helpers;
mod logo_store;
mod routes;
mod state;
#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use aquamark_core::AppConfig;
use logo_store::HttpLogoStore;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "aquamark-web")]
#[command(author, version, about = "Aquamark Watermarking Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Base URL of the logo store; logos are fetched as <base>/<user_email>.png
    #[arg(long, env = "AQUAMARK_LOGO_BASE")]
    logo_base: String,

    /// Static bearer token; when set, requests must carry it
    #[arg(long, env = "AQUAMARK_API_TOKEN")]
    api_token: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging with per-crate filtering
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    let logo_store = Arc::new(HttpLogoStore::new(args.logo_base));
    let state = Arc::new(
        AppState::new(config, logo_store, args.api_token)
            .context("Failed to initialize application state")?,
    );

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/watermark", post(routes::watermark))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB limit for uploads
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
