//! The book table: canonical order, New Testament membership and labels.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::canonical::canonical_hash_hex;
use crate::types::Testament;

/// Position given to books that are not in the canon.
///
/// Strictly greater than any valid index, so unknown books sort last.
pub const UNKNOWN_BOOK_INDEX: u64 = 999;

/// Built-in German table.
const GERMAN_TABLE: &str = include_str!("../../data/canon/books_de.json");

/// Serialized form of a book table.
///
/// ```json
/// { "name": "de", "order": ["Gen", ...], "newTestament": ["Matt", ...],
///   "labels": { "Gen": "Genesis", ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTable {
    /// Table identifier recorded in manifests.
    pub name: String,
    /// Abbreviations in canonical order (OT, deuterocanonical, NT).
    pub order: Vec<String>,
    /// Abbreviations classified as New Testament.
    pub new_testament: Vec<String>,
    /// Abbreviation → display label.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Errors raised while loading a book table.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    /// The table file could not be read.
    #[error("failed to read book table {path}: {source}")]
    Io {
        /// Path of the table.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The table is not valid JSON for [`BookTable`].
    #[error("invalid book table: {0}")]
    Json(#[from] serde_json::Error),
    /// An abbreviation appears twice in the order list.
    #[error("book '{0}' appears more than once in the canonical order")]
    DuplicateBook(String),
    /// An NT abbreviation is missing from the order list.
    #[error("New Testament book '{0}' is not part of the canonical order")]
    UnorderedTestamentBook(String),
    /// The table has no room below the unknown-book sentinel.
    #[error("book table has {0} entries, at most {max} are supported", max = UNKNOWN_BOOK_INDEX)]
    TooManyBooks(usize),
}

/// Immutable lookup tables for book order, testament and label.
///
/// Built once at startup and shared by reference (usually inside an `Arc`).
#[derive(Debug, Clone)]
pub struct BookCanon {
    table: BookTable,
    index: HashMap<String, usize>,
    new_testament: HashSet<String>,
    fingerprint: String,
}

impl BookCanon {
    /// Validate a table and build the lookups.
    pub fn from_table(table: BookTable) -> Result<Self, CanonError> {
        if table.order.len() as u64 >= UNKNOWN_BOOK_INDEX {
            return Err(CanonError::TooManyBooks(table.order.len()));
        }

        let mut index = HashMap::with_capacity(table.order.len());
        for (position, book) in table.order.iter().enumerate() {
            if index.insert(book.clone(), position).is_some() {
                return Err(CanonError::DuplicateBook(book.clone()));
            }
        }

        let mut new_testament = HashSet::with_capacity(table.new_testament.len());
        for book in &table.new_testament {
            if !index.contains_key(book) {
                return Err(CanonError::UnorderedTestamentBook(book.clone()));
            }
            new_testament.insert(book.clone());
        }

        let fingerprint = canonical_hash_hex(&table);

        Ok(Self {
            table,
            index,
            new_testament,
            fingerprint,
        })
    }

    /// Parse a table from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CanonError> {
        Self::from_table(serde_json::from_str(json)?)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CanonError> {
        let json = std::fs::read_to_string(path).map_err(|source| CanonError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The built-in table with German display labels.
    pub fn german() -> Self {
        Self::from_json(GERMAN_TABLE).expect("built-in book table is valid")
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// Hash of the table, changes whenever order, testament set or labels change.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Underlying table.
    pub fn table(&self) -> &BookTable {
        &self.table
    }

    /// Books in canonical order.
    pub fn books(&self) -> impl Iterator<Item = &str> {
        self.table.order.iter().map(String::as_str)
    }

    /// Number of books in the canon.
    pub fn len(&self) -> usize {
        self.table.order.len()
    }

    /// Whether the canon is empty.
    pub fn is_empty(&self) -> bool {
        self.table.order.is_empty()
    }

    /// Position of a known book.
    pub fn index(&self, book: &str) -> Option<usize> {
        self.index.get(book).copied()
    }

    /// Whether a book is part of the canon.
    pub fn contains(&self, book: &str) -> bool {
        self.index.contains_key(book)
    }

    /// Sort position; unknown books get [`UNKNOWN_BOOK_INDEX`].
    pub fn order_index(&self, book: &str) -> u64 {
        self.index(book)
            .map(|i| i as u64)
            .unwrap_or(UNKNOWN_BOOK_INDEX)
    }

    /// Display label; unmapped books return the abbreviation unchanged.
    pub fn label<'a>(&'a self, book: &'a str) -> &'a str {
        self.table
            .labels
            .get(book)
            .map(String::as_str)
            .unwrap_or(book)
    }

    /// `NT` for members of the New Testament set, `OT` for everything else.
    pub fn testament(&self, book: &str) -> Testament {
        if self.new_testament.contains(book) {
            Testament::New
        } else {
            Testament::Old
        }
    }
}

impl Default for BookCanon {
    fn default() -> Self {
        Self::german()
    }
}
