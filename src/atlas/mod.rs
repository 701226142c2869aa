//! Atlas: page data for the corpus web views.
//!
//! Each page is built from a [`CorpusSource`](crate::store::CorpusSource)
//! with one [`OsisNormalizer`](crate::OsisNormalizer):
//!
//! 1. **Bibelstellen**: references grouped by book with their citing documents
//! 2. **Sankey**: citation flow between bible nodes and documents
//! 3. **Register**: places and people with authority links
//! 4. **Audit**: data-quality findings over the stored references
//! 5. **Bundle**: all pages written with a manifest
//!
//! ## Architecture
//!
//! ```text
//! CorpusSource → pages → export → atlas_manifest.json
//!                  ↓
//!      bibelstellen / sankey_{verse,chapter,book} / register / audit
//! ```
//!
//! Given the same corpus and canon, an export produces byte-identical
//! artifacts apart from the manifest timestamp.

pub mod bibelstellen;
pub mod sankey;
pub mod register;
pub mod audit;
pub mod pages;
pub mod bundler;
pub mod export;

// Re-exports
pub use bibelstellen::{
    build_bible_index, BibleIndexPage, BookEntry, DocumentCitation, ReferenceAggregate,
    ReferenceEntry,
};
pub use sankey::{
    aggregate_to_chapters, build_sankey, normalize_graph, sort_nodes, NodeOrder, SankeyGraph, SankeyLevel,
    SankeyLink, SankeyNode, UnknownLevel,
};
pub use register::{resolve_wikidata_url, with_norm_links, RegisterPage};
pub use audit::{audit_references, check_occurrence, AuditFinding, AuditReport};
pub use pages::{load_audit, load_bible_index, load_register, load_sankey, AtlasPages, BoxError, LoadError};
pub use bundler::{AtlasBundler, AtlasManifest, AtlasStats, BundleError, ExportPaths};
pub use export::{export_atlas, write_json_pretty, write_pages, ExportError};

/// Atlas schema version. Increment on breaking changes.
pub const ATLAS_SCHEMA_VERSION: &str = "atlas_v1";
