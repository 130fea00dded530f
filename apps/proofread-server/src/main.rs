//! Proofreading server
//!
//! HTTP front end for the proofreading engine. Provides REST endpoints for:
//!
//! - Proofreading plain text against the house style guide
//! - Proofreading an uploaded PDF (base64 body)
//! - Relaying raw prompts to the model provider
//!
//! ## Architecture
//!
//! Deterministic rule checks run in-process; the AI review goes through the
//! configured model endpoint with the caller's own API key. The server keeps
//! no per-user state.
//!
//! - Rate limiting via tower-governor
//! - Open CORS for the browser front end

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use proofread_engine::config::{ProofreadConfig, WireFormat};
use proofread_engine::{HttpModelClient, Proofreader};
use shared_pdf::PdfTextExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
#[cfg(test)]
mod tests;

use api::{handle_health, handle_proofread, handle_proofread_pdf, handle_relay};

/// Command-line arguments for the proofreading server
#[derive(Parser, Debug)]
#[command(name = "proofread-server")]
#[command(about = "Style-guide proofreading server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model request timeout in milliseconds (overrides the config file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub proofreader: Arc<Proofreader>,
    pub extractor: Arc<PdfTextExtractor>,
    /// Messages API client used by the relay endpoint
    pub relay: Arc<HttpModelClient>,
}

impl AppState {
    pub fn config(&self) -> &ProofreadConfig {
        self.proofreader.config()
    }
}

/// Build state from configuration with the HTTP model client
pub fn build_state(config: ProofreadConfig) -> anyhow::Result<AppState> {
    let client = HttpModelClient::new(config.model.clone())
        .context("Failed to create model client")?;

    let mut relay_config = config.model.clone();
    relay_config.wire = WireFormat::Anthropic;
    let relay = HttpModelClient::new(relay_config).context("Failed to create relay client")?;

    Ok(AppState {
        extractor: Arc::new(PdfTextExtractor::new(config.input.max_pdf_bytes)),
        relay: Arc::new(relay),
        proofreader: Arc::new(Proofreader::new(Arc::new(client), config)),
    })
}

/// Routes without the rate limiter, which needs peer addresses
pub fn build_router(state: AppState) -> Router {
    // base64 inflates by 4/3; leave room for the JSON envelope
    let body_limit = state.config().input.max_pdf_bytes / 3 * 4 + 64 * 1024;

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/proofread", post(handle_proofread))
        .route("/api/proofread/pdf", post(handle_proofread_pdf))
        .route("/api/relay", post(handle_relay))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => ProofreadConfig::from_file(path)?,
        None => ProofreadConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.model.timeout_ms = timeout_ms;
    }

    info!("Starting proofread server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    let timeout_ms = config.model.timeout_ms;
    let endpoint = config.model.endpoint.clone();
    let state = build_state(config)?;

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Model endpoint: {}", endpoint);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Model timeout: {}ms", timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
