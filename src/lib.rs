//! # aco-atlas
//!
//! OSIS reference normalization and page data for the ACO corpus web views.
//!
//! The crate answers one question for every view that shows biblical
//! references:
//!
//! > Given an OSIS text like `Gen.3.16-18`, where does it sort, and how is it labeled?
//!
//! ## Core Contract
//!
//! 1. Parse any reference text into book, chapter, verse and range end without failing
//! 2. Order references canonically by book position, chapter and verse
//! 3. Label books and references with the configured (German) display names
//! 4. Aggregate detected citations into per-book, per-reference document lists
//!
//! ## Architecture
//!
//! ```text
//! BookCanon (JSON table) → OsisNormalizer → atlas pages → export / service
//!                                ↑
//!              CorpusSource (files or memory) ← sync (pipeline output → web app)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same canon + same corpus → identical pages and artifact hashes
//! - Reference ordering is total: order key, then range end, then raw text
//! - Unknown books sort after every known book

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod canon;
pub mod normalizer;
pub mod config;
pub mod store;
pub mod atlas;
pub mod sync;
pub mod canonical;
pub mod digest;
pub mod telemetry;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    OsisReference, OsisParseError, Testament, RefOccurrence, BibleRefRecord,
    DocumentMeta, DocumentIndex, NetworkGraph, NetworkNode, NetworkLink, NodeKind,
    RegisterFile, PersonBio,
};
pub use canon::{BookCanon, BookTable, CanonError, UNKNOWN_BOOK_INDEX};
pub use normalizer::{OsisNormalizer, ReferenceIssue};
pub use config::{AtlasPaths, ProjectLayout, ConfigError};
pub use store::{CorpusSource, FsCorpusSource, InMemoryCorpusSource, SourceError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use sync::{SyncTarget, SyncReport, SyncError};

// Atlas re-exports
pub use atlas::{
    ReferenceAggregate, BibleIndexPage, BookEntry, ReferenceEntry, DocumentCitation,
    build_bible_index,
    SankeyGraph, SankeyLevel, SankeyNode, SankeyLink,
    normalize_graph, aggregate_to_chapters,
    RegisterPage, AuditReport, audit_references,
    AtlasPages, AtlasBundler, AtlasManifest, ExportPaths, export_atlas,
    ATLAS_SCHEMA_VERSION,
};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version for all serialized page types.
/// Increment on breaking changes to any page shape.
pub const ACO_ATLAS_SCHEMA_VERSION: &str = "1.0.0";
