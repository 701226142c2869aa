//! The OSIS reference normalizer.
//!
//! Every view that sorts, labels or classifies references goes through one
//! [`OsisNormalizer`], so the Sankey chart, the bibelstellen index and the
//! exports agree on order and wording.
//!
//! ## Ordering
//!
//! ```text
//! order_key = book_index * 1_000_000 + min(chapter, 999) * 1_000 + min(verse, 999)
//! ```
//!
//! [`OsisNormalizer::compare`] orders by `order_key`, then by range end (a
//! single verse before a range starting there, shorter ranges first), then by
//! the raw text. Unknown books share the index [`UNKNOWN_BOOK_INDEX`] and
//! therefore follow every known book.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::canon::{BookCanon, UNKNOWN_BOOK_INDEX};
use crate::types::{OsisReference, Testament};

/// Weight of the book position in an order key.
pub const BOOK_WEIGHT: u64 = 1_000_000;
/// Weight of the chapter in an order key.
pub const CHAPTER_WEIGHT: u64 = 1_000;
/// Largest chapter or verse that still fits its slot in an order key.
pub const MAX_KEYED_NUMBER: u32 = 999;

/// Data-quality problem found in a single reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceIssue {
    /// Strict parsing failed.
    Malformed {
        /// Parser message.
        message: String,
    },
    /// The book is not part of the canon.
    UnknownBook {
        /// Book abbreviation.
        book: String,
    },
    /// The record's `book` field disagrees with the reference text.
    BookMismatch {
        /// Book declared by the record.
        declared: String,
        /// Book found in the OSIS text.
        parsed: String,
    },
}

impl ReferenceIssue {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::UnknownBook { .. } => "unknown_book",
            Self::BookMismatch { .. } => "book_mismatch",
        }
    }
}

/// Parses, orders, labels and classifies OSIS references against a canon.
#[derive(Debug, Clone)]
pub struct OsisNormalizer {
    canon: Arc<BookCanon>,
}

impl OsisNormalizer {
    /// Create a normalizer over a shared canon.
    pub fn new(canon: Arc<BookCanon>) -> Self {
        Self { canon }
    }

    /// The canon this normalizer reads from.
    pub fn canon(&self) -> &BookCanon {
        &self.canon
    }

    /// Shared handle to the canon.
    pub fn canon_arc(&self) -> Arc<BookCanon> {
        Arc::clone(&self.canon)
    }

    /// Tolerant parse, see [`OsisReference::parse`].
    pub fn parse(&self, text: &str) -> OsisReference {
        OsisReference::parse(text)
    }

    /// Sort position of a book.
    pub fn book_index(&self, book: &str) -> u64 {
        self.canon.order_index(book)
    }

    /// Numeric sort key of a reference text.
    pub fn order_key(&self, text: &str) -> u64 {
        self.order_key_of(&OsisReference::parse(text))
    }

    /// Numeric sort key of a parsed reference.
    pub fn order_key_of(&self, reference: &OsisReference) -> u64 {
        let chapter = u64::from(reference.chapter.min(MAX_KEYED_NUMBER));
        let verse = u64::from(reference.verse.min(MAX_KEYED_NUMBER));
        self.book_index(&reference.book) * BOOK_WEIGHT + chapter * CHAPTER_WEIGHT + verse
    }

    /// Total order over reference texts.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let ra = OsisReference::parse(a);
        let rb = OsisReference::parse(b);
        self.order_key_of(&ra)
            .cmp(&self.order_key_of(&rb))
            .then_with(|| ra.verse_end.cmp(&rb.verse_end))
            .then_with(|| a.cmp(b))
    }

    /// Order of two books: canonical position, then label.
    pub fn compare_books(&self, a: &str, b: &str) -> Ordering {
        self.book_index(a)
            .cmp(&self.book_index(b))
            .then_with(|| self.label(a).cmp(self.label(b)))
    }

    /// Display label of a book; unmapped books come back unchanged.
    pub fn label<'a>(&'a self, book: &'a str) -> &'a str {
        self.canon.label(book)
    }

    /// Testament of a book.
    pub fn testament(&self, book: &str) -> Testament {
        self.canon.testament(book)
    }

    /// Whether the book is part of the canon.
    pub fn is_known_book(&self, book: &str) -> bool {
        self.canon.contains(book)
    }

    /// Human-readable form of a reference text.
    ///
    /// ```rust
    /// use aco_atlas::OsisNormalizer;
    ///
    /// let normalizer = OsisNormalizer::default();
    /// assert_eq!(normalizer.format_display("Gen.3.16-18"), "Genesis 3,16–18");
    /// assert_eq!(normalizer.format_display("Ps.23"), "Psalmen 23");
    /// ```
    pub fn format_display(&self, text: &str) -> String {
        self.format_reference(&OsisReference::parse(text))
    }

    /// Human-readable form of a parsed reference.
    pub fn format_reference(&self, reference: &OsisReference) -> String {
        let label = self.label(&reference.book);
        if reference.chapter == 0 {
            return label.to_string();
        }
        if reference.verse == 0 {
            return format!("{} {}", label, reference.chapter);
        }
        if reference.is_range() {
            return format!(
                "{} {},{}\u{2013}{}",
                label, reference.chapter, reference.verse, reference.verse_end
            );
        }
        format!("{} {},{}", label, reference.chapter, reference.verse)
    }

    /// Data-quality issues of a reference text; empty when it is clean.
    pub fn validate(&self, text: &str) -> Vec<ReferenceIssue> {
        match OsisReference::parse_strict(text) {
            Ok(reference) if self.is_known_book(&reference.book) => Vec::new(),
            Ok(reference) => vec![ReferenceIssue::UnknownBook {
                book: reference.book,
            }],
            Err(e) => {
                let mut issues = vec![ReferenceIssue::Malformed {
                    message: e.to_string(),
                }];
                let book = OsisReference::parse(text).book;
                if !book.is_empty() && !self.is_known_book(&book) {
                    issues.push(ReferenceIssue::UnknownBook { book });
                }
                issues
            }
        }
    }

    /// Whether an order key belongs to a book outside the canon.
    pub fn is_unknown_key(key: u64) -> bool {
        key / BOOK_WEIGHT >= UNKNOWN_BOOK_INDEX
    }
}

impl Default for OsisNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(BookCanon::german()))
    }
}
