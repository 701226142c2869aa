//! Book canon configuration.

pub mod table;

pub use table::{BookCanon, BookTable, CanonError, UNKNOWN_BOOK_INDEX};
