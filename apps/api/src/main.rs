mod config;
mod errors;
mod gemini_client;
mod pipeline;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gemini_client::GeminiClient;
use crate::pipeline::orchestrator::Orchestrator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GEMINI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scene-Splice API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Gemini client with the startup-validated credential
    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    info!(
        "Gemini client initialized (describe: {}, compose: {})",
        gemini_client::DESCRIBE_MODEL,
        gemini_client::COMPOSE_MODEL
    );

    // Build app state around the single run orchestrator
    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(Arc::new(gemini))),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
