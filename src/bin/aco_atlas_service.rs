//! Atlas Service Binary
//!
//! Runs the page loaders and the normalizer as a REST API service:
//! - Structured JSON logging for Cloud Logging
//! - Request tracing with correlation IDs
//! - Graceful shutdown handling
//! - Health check endpoints
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ACO_ROOT`: Project root holding the web app data (default: current directory)
//! - `ACO_BOOK_TABLE`: Book table JSON replacing the built-in German canon
//! - `ACO_PATHS`: JSON file overriding parts of the project layout
//! - `PORT`: Service port (default: 8002)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! ACO_ROOT=../aco-web cargo run --bin aco-atlas-service --features service
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};

use aco_atlas::service::{create_router, metrics_middleware, ServiceState};
use aco_atlas::telemetry::{init_tracing, LogFormat};
use aco_atlas::{AtlasPaths, BookCanon, FsCorpusSource, OsisNormalizer, ProjectLayout};

/// Request logging middleware that adds correlation ID and timing
async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    // Extract Cloud Trace context if present
    let trace_id = request
        .headers()
        .get("X-Cloud-Trace-Context")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split('/').next().unwrap_or(s).to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    info!(
        target: "aco_atlas_service::access",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(
        LogFormat::from_env_or(LogFormat::Json),
        "aco_atlas_service=info,aco_atlas=info,tower_http=info",
    );

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(
        version = version,
        build_sha = build_sha,
        "Starting Atlas Service"
    );

    // Load configuration from environment
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8002);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let root = env_path("ACO_ROOT").unwrap_or_else(|| PathBuf::from("."));

    let paths = match env_path("ACO_PATHS") {
        Some(path) => AtlasPaths::from_json_file(&path).map_err(|e| {
            tracing::error!(error = %e, "Failed to load layout override");
            e
        })?,
        None => AtlasPaths::default(),
    };

    let canon = match env_path("ACO_BOOK_TABLE") {
        Some(path) => BookCanon::from_path(&path).map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "Failed to load book table");
            e
        })?,
        None => BookCanon::german(),
    };
    info!(
        canon = %canon.name(),
        books = canon.len(),
        canon_fingerprint = %canon.fingerprint(),
        "Book canon initialized"
    );

    let layout = ProjectLayout::with_paths(root, paths);
    info!(root = %layout.root().display(), "Serving corpus data");

    let state = ServiceState::new(
        FsCorpusSource::new(layout),
        OsisNormalizer::new(Arc::new(canon)),
    );

    // Build router with middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(
        address = %addr,
        version = version,
        "Atlas Service listening"
    );

    let listener = TcpListener::bind(addr).await?;

    // Graceful shutdown handling
    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
            _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
        }
    };

    info!("Ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Atlas Service shutdown complete");

    Ok(())
}
