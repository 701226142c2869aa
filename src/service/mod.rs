//! Atlas REST Service
//!
//! Serves the page data and the normalizer over HTTP.
//!
//! ## Endpoints
//!
//! - `GET /api/bibelstellen` - References grouped by book with citing documents
//! - `GET /api/register` - Places and people with authority links
//! - `GET /api/sankey?level=verse|chapter|book` - Citation flow graph
//! - `GET /api/audit` - Data-quality audit of the stored references
//! - `GET /api/osis/:reference` - Parse, key and label one reference
//! - `GET /api/canon` - The configured book table
//! - `POST /api/reload` - Drop cached pages
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_page_build, record_reload};
pub use routes::{create_router, AppState, ErrorResponse};
pub use state::{PageCache, ServiceState};
