//! Axum routes for the atlas service.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::atlas::{AuditReport, BibleIndexPage, LoadError, RegisterPage, SankeyGraph, SankeyLevel};
use crate::normalizer::ReferenceIssue;
use crate::store::{CorpusSource, FsCorpusSource};
use crate::types::{OsisReference, Testament};
use crate::{ACO_ATLAS_SCHEMA_VERSION, ATLAS_SCHEMA_VERSION};

use super::middleware::record_reload;
use super::state::ServiceState;

/// Type alias for the service state over the project files.
pub type AppState = ServiceState<FsCorpusSource>;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query of the sankey endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SankeyQuery {
    /// `verse`, `chapter` or `book`; defaults to `verse`.
    pub level: Option<String>,
}

/// One reference as the normalizer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsisResponse {
    /// Text as requested.
    pub input: String,
    /// Parsed reference.
    pub reference: OsisReference,
    /// Canonical sort key.
    pub order_key: u64,
    /// Display form.
    pub display: String,
    /// Book display label.
    pub book_label: String,
    /// Testament of the book.
    pub testament: Testament,
    /// Whether the book is in the canon.
    pub known_book: bool,
    /// Strict validation findings.
    pub issues: Vec<ReferenceIssue>,
}

/// One canon book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonBook {
    /// Position in the canon.
    pub index: usize,
    /// Abbreviation.
    pub book: String,
    /// Display label.
    pub label: String,
    /// Testament.
    pub testament: Testament,
}

/// The configured canon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonResponse {
    /// Table name.
    pub name: String,
    /// Table fingerprint.
    pub fingerprint: String,
    /// Books in canonical order.
    pub books: Vec<CanonBook>,
}

/// Result of a cache reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    /// Pages dropped.
    pub cleared: usize,
    /// Cache generation after the reload.
    pub generation: u64,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub atlas_version: String,
    pub canon_name: String,
    pub canon_fingerprint: String,
    pub cached_pages: usize,
    pub cache_generation: u64,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub corpus: bool,
    pub details: Option<String>,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Build a page off the async runtime; page loaders do blocking file I/O.
async fn build_page<S, T, F>(state: &Arc<ServiceState<S>>, build: F) -> Result<T, ApiError>
where
    S: CorpusSource + 'static,
    T: Send + 'static,
    F: FnOnce(&ServiceState<S>) -> Result<T, LoadError> + Send + 'static,
{
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || build(&state)).await {
        Ok(Ok(page)) => Ok(page),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "page build failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("PAGE_LOAD_FAILED", e.to_string())),
            ))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("TASK_FAILED", format!("Page build task failed: {}", e))),
        )),
    }
}

/// References grouped by book.
async fn bibelstellen_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<Arc<BibleIndexPage>>, ApiError> {
    build_page(&state, |s| s.bible_index()).await.map(Json)
}

/// Places and people.
async fn register_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<Arc<RegisterPage>>, ApiError> {
    build_page(&state, |s| s.register()).await.map(Json)
}

/// Citation flow graph at the requested level.
async fn sankey_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Query(query): Query<SankeyQuery>,
) -> Result<Json<Arc<SankeyGraph>>, ApiError> {
    let level = match query.level.as_deref() {
        None | Some("") => SankeyLevel::default(),
        Some(raw) => raw.parse::<SankeyLevel>().map_err(|e| {
            tracing::warn!(level = %raw, "rejected sankey level");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("INVALID_LEVEL", e.to_string()).with_details(raw)),
            )
        })?,
    };

    build_page(&state, move |s| s.sankey(level)).await.map(Json)
}

/// Data-quality audit of the stored references.
async fn audit_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<Arc<AuditReport>>, ApiError> {
    build_page(&state, |s| s.audit()).await.map(Json)
}

/// Parse, key and label a single reference.
async fn osis_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(input): Path<String>,
) -> Json<OsisResponse> {
    let normalizer = &state.normalizer;
    let reference = normalizer.parse(&input);

    Json(OsisResponse {
        order_key: normalizer.order_key_of(&reference),
        display: normalizer.format_reference(&reference),
        book_label: normalizer.label(&reference.book).to_string(),
        testament: normalizer.testament(&reference.book),
        known_book: normalizer.is_known_book(&reference.book),
        issues: normalizer.validate(&input),
        reference,
        input,
    })
}

/// The configured book table.
async fn canon_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<CanonResponse> {
    let canon = state.normalizer.canon();
    let books = canon
        .books()
        .enumerate()
        .map(|(index, book)| CanonBook {
            index,
            book: book.to_string(),
            label: canon.label(book).to_string(),
            testament: canon.testament(book),
        })
        .collect();

    Json(CanonResponse {
        name: canon.name().to_string(),
        fingerprint: canon.fingerprint().to_string(),
        books,
    })
}

/// Drop all cached pages so the next request rebuilds them.
async fn reload_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<ReloadResponse> {
    let (cleared, generation) = state.reload();
    record_reload(cleared, generation);
    Json(ReloadResponse { cleared, generation })
}

/// Health check endpoint (detailed).
async fn health_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<HealthResponse> {
    let (cached_pages, cache_generation) = state.cache_stats();
    let canon = state.normalizer.canon();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: ACO_ATLAS_SCHEMA_VERSION.to_string(),
        atlas_version: ATLAS_SCHEMA_VERSION.to_string(),
        canon_name: canon.name().to_string(),
        canon_fingerprint: canon.fingerprint().to_string(),
        cached_pages,
        cache_generation,
    })
}

/// Liveness probe endpoint.
///
/// Simple check that the service is running. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 once the bibelstellen page can be built, 503 otherwise.
async fn readiness_handler<S: CorpusSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    match build_page(&state, |s| s.bible_index()).await {
        Ok(_) => Ok(Json(ReadinessResponse {
            ready: true,
            corpus: true,
            details: None,
        })),
        Err((_, Json(error))) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                corpus: false,
                details: Some(error.error),
            }),
        )),
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the atlas service.
pub fn create_router<S: CorpusSource + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Pages
        .route("/api/bibelstellen", get(bibelstellen_handler::<S>))
        .route("/api/register", get(register_handler::<S>))
        .route("/api/sankey", get(sankey_handler::<S>))
        .route("/api/audit", get(audit_handler::<S>))
        // Normalizer
        .route("/api/osis/:reference", get(osis_handler::<S>))
        .route("/api/canon", get(canon_handler::<S>))
        // Cache
        .route("/api/reload", post(reload_handler::<S>))
        // Health checks (Cloud Run compatible)
        .route("/health", get(health_handler::<S>))         // Detailed health
        .route("/health/live", get(liveness_handler))        // Liveness probe
        .route("/health/ready", get(readiness_handler::<S>)) // Readiness probe
        .with_state(state)
}
