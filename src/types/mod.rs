//! Core types shared by the normalizer, page loaders and sync steps.

pub mod osis;
pub mod citation;
pub mod document;
pub mod network;
pub mod register;

pub use osis::{OsisReference, OsisParseError, Field, Testament};
pub use citation::{RefOccurrence, BibleRefRecord, BibleRefsPayload, BibleRefsMeta};
pub use document::{
    DocumentMeta, MetadataFile, DocumentIndex, DocumentSortKey,
    compare_docs, parse_doc_num,
};
pub use network::{NetworkGraph, NetworkNode, NetworkLink, NodeKind};
pub use register::{RegisterEntry, RegisterData, RegisterFile, PersonBio, PersonBiosFile};
