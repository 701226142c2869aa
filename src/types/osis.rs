//! OSIS reference types.
//!
//! An OSIS reference is the compact citation form `Book.Chapter.Verse[-VerseEnd]`
//! produced by the reference detector upstream (`Gen.3.16`, `1Cor.2.3-5`,
//! `Ps.23`, `Rev`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed biblical citation.
///
/// Numeric fields are `0` when absent or malformed. `book` is the first
/// `.`-delimited segment of the source text and is never checked against the
/// canon here; see [`crate::canon::BookCanon`] for lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsisReference {
    /// Book abbreviation (e.g. `Gen`, `1Cor`).
    pub book: String,
    /// Chapter number, `0` if absent.
    pub chapter: u32,
    /// Verse number, `0` if absent.
    pub verse: u32,
    /// Last verse of a range, `0` if absent or not a range.
    pub verse_end: u32,
}

impl OsisReference {
    /// Parse a reference, defaulting every absent or malformed number to `0`.
    ///
    /// This never fails. An empty string yields an empty book with all
    /// numeric fields zero.
    ///
    /// ```rust
    /// use aco_atlas::OsisReference;
    ///
    /// let r = OsisReference::parse("Gen.3.16-18");
    /// assert_eq!(r.book, "Gen");
    /// assert_eq!((r.chapter, r.verse, r.verse_end), (3, 16, 18));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut segments = text.split('.');
        let book = segments.next().unwrap_or_default().to_string();
        let chapter = segments.next().map(lenient_number).unwrap_or(0);

        let (verse, verse_end) = match segments.next() {
            Some(segment) => {
                let mut range = segment.split('-');
                let verse = range.next().map(lenient_number).unwrap_or(0);
                let verse_end = range.next().map(lenient_number).unwrap_or(0);
                (verse, verse_end)
            }
            None => (0, 0),
        };

        Self {
            book,
            chapter,
            verse,
            verse_end,
        }
    }

    /// Parse a reference, rejecting input that does not follow the OSIS form.
    ///
    /// Partial references (`Gen`, `Gen.3`) are accepted. Rejected: empty
    /// input, an empty or non-alphanumeric book, non-numeric chapter or verse
    /// segments, more than three segments, and ranges that end before they
    /// start.
    pub fn parse_strict(text: &str) -> Result<Self, OsisParseError> {
        if text.trim().is_empty() {
            return Err(OsisParseError::Empty);
        }

        let segments: Vec<&str> = text.split('.').collect();
        if segments.len() > 3 {
            return Err(OsisParseError::TooManySegments {
                text: text.to_string(),
                count: segments.len(),
            });
        }

        let book = segments[0];
        if book.is_empty() {
            return Err(OsisParseError::EmptyBook {
                text: text.to_string(),
            });
        }
        if !book.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OsisParseError::InvalidBook {
                book: book.to_string(),
            });
        }

        let chapter = match segments.get(1) {
            Some(segment) => strict_number(segment, Field::Chapter)?,
            None => 0,
        };

        let (verse, verse_end) = match segments.get(2) {
            Some(segment) => match segment.split_once('-') {
                Some((start, end)) => (
                    strict_number(start, Field::Verse)?,
                    strict_number(end, Field::VerseEnd)?,
                ),
                None => (strict_number(segment, Field::Verse)?, 0),
            },
            None => (0, 0),
        };

        if verse_end != 0 && verse_end < verse {
            return Err(OsisParseError::InvertedRange {
                text: text.to_string(),
                verse,
                verse_end,
            });
        }

        Ok(Self {
            book: book.to_string(),
            chapter,
            verse,
            verse_end,
        })
    }

    /// Whether this reference names a verse range.
    pub fn is_range(&self) -> bool {
        self.verse_end > self.verse
    }

    /// Chapter-level key: `Book.Chapter`, or just `Book` without a chapter.
    pub fn chapter_key(&self) -> String {
        if self.chapter > 0 {
            format!("{}.{}", self.book, self.chapter)
        } else {
            self.book.clone()
        }
    }
}

impl fmt::Display for OsisReference {
    /// Writes the compact OSIS form (`Gen.3.16-18`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.book)?;
        if self.chapter > 0 || self.verse > 0 {
            write!(f, ".{}", self.chapter)?;
        }
        if self.verse > 0 {
            write!(f, ".{}", self.verse)?;
            if self.verse_end > 0 {
                write!(f, "-{}", self.verse_end)?;
            }
        }
        Ok(())
    }
}

/// Read a decimal prefix the way the web views always have: optional
/// surrounding whitespace, an optional `+`, then ASCII digits. No digits, a
/// negative sign or an overflowing value all give `0`.
fn lenient_number(segment: &str) -> u32 {
    let trimmed = segment.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    trimmed[..digits_end].parse().unwrap_or(0)
}

fn strict_number(segment: &str, field: Field) -> Result<u32, OsisParseError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OsisParseError::InvalidNumber {
            field,
            value: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| OsisParseError::InvalidNumber {
        field,
        value: segment.to_string(),
    })
}

/// Numeric field of an OSIS reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Second segment.
    Chapter,
    /// Third segment, before `-`.
    Verse,
    /// Third segment, after `-`.
    VerseEnd,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter => write!(f, "chapter"),
            Self::Verse => write!(f, "verse"),
            Self::VerseEnd => write!(f, "verse end"),
        }
    }
}

/// Reasons a reference fails strict parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OsisParseError {
    /// Input was empty or whitespace.
    #[error("empty reference")]
    Empty,
    /// First segment was empty (e.g. `.3.16`).
    #[error("missing book in reference '{text}'")]
    EmptyBook {
        /// Source text.
        text: String,
    },
    /// Book contained characters other than ASCII letters and digits.
    #[error("invalid book abbreviation '{book}'")]
    InvalidBook {
        /// Offending book segment.
        book: String,
    },
    /// A numeric segment was not a plain decimal number.
    #[error("invalid {field} '{value}'")]
    InvalidNumber {
        /// Which field failed.
        field: Field,
        /// Raw segment.
        value: String,
    },
    /// More than `Book.Chapter.Verse`.
    #[error("reference '{text}' has {count} segments, expected at most 3")]
    TooManySegments {
        /// Source text.
        text: String,
        /// Number of `.`-separated segments.
        count: usize,
    },
    /// Range end lies before its start.
    #[error("range in '{text}' ends at {verse_end} before it starts at {verse}")]
    InvertedRange {
        /// Source text.
        text: String,
        /// Range start.
        verse: u32,
        /// Range end.
        verse_end: u32,
    },
}

/// Old/New Testament classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Testament {
    /// Old Testament, including the deuterocanonical books.
    #[serde(rename = "OT")]
    Old,
    /// New Testament.
    #[serde(rename = "NT")]
    New,
    /// Not classified (network records may carry `UNK` or anything else).
    #[serde(rename = "UNK", other)]
    Unknown,
}

impl Testament {
    /// Short code used in JSON (`OT`, `NT`, `UNK`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Old => "OT",
            Self::New => "NT",
            Self::Unknown => "UNK",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_reference() {
        let r = OsisReference::parse("Gen.3.16");
        assert_eq!(r.book, "Gen");
        assert_eq!(r.chapter, 3);
        assert_eq!(r.verse, 16);
        assert_eq!(r.verse_end, 0);
    }

    #[test]
    fn test_parse_range() {
        let r = OsisReference::parse("Gen.3.16-18");
        assert_eq!(r.verse, 16);
        assert_eq!(r.verse_end, 18);
        assert!(r.is_range());
    }

    #[test]
    fn test_parse_book_only() {
        let r = OsisReference::parse("Gen");
        assert_eq!(r.book, "Gen");
        assert_eq!(r.chapter, 0);
        assert_eq!(r.verse, 0);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(OsisReference::parse(""), OsisReference::default());
        assert_eq!(OsisReference::parse("").book, "");
    }

    #[test]
    fn test_parse_unknown_book_tolerated() {
        let r = OsisReference::parse("Xyz.1.1");
        assert_eq!(r.book, "Xyz");
        assert_eq!((r.chapter, r.verse), (1, 1));
    }

    #[test]
    fn test_parse_malformed_numbers_default_to_zero() {
        let r = OsisReference::parse("Gen.x.y-z");
        assert_eq!((r.chapter, r.verse, r.verse_end), (0, 0, 0));

        let r = OsisReference::parse("Gen.-3.5");
        assert_eq!(r.chapter, 0);
        assert_eq!(r.verse, 5);

        let r = OsisReference::parse("Gen.99999999999.1");
        assert_eq!(r.chapter, 0);
    }

    #[test]
    fn test_parse_numeric_prefix() {
        let r = OsisReference::parse("Ps.23a.4f");
        assert_eq!(r.chapter, 23);
        assert_eq!(r.verse, 4);
    }

    #[test]
    fn test_strict_accepts_partial() {
        assert_eq!(OsisReference::parse_strict("Gen").unwrap().book, "Gen");
        assert_eq!(OsisReference::parse_strict("Gen.3").unwrap().chapter, 3);
        let r = OsisReference::parse_strict("1Cor.2.3-5").unwrap();
        assert_eq!((r.chapter, r.verse, r.verse_end), (2, 3, 5));
    }

    #[test]
    fn test_strict_rejects_malformed() {
        assert_eq!(OsisReference::parse_strict(""), Err(OsisParseError::Empty));
        assert!(matches!(
            OsisReference::parse_strict("Gen.x"),
            Err(OsisParseError::InvalidNumber { field: Field::Chapter, .. })
        ));
        assert!(matches!(
            OsisReference::parse_strict("Gen.3.5-2"),
            Err(OsisParseError::InvertedRange { verse: 5, verse_end: 2, .. })
        ));
        assert!(matches!(
            OsisReference::parse_strict(".3.16"),
            Err(OsisParseError::EmptyBook { .. })
        ));
        assert!(matches!(
            OsisReference::parse_strict("Gen.1.2.3"),
            Err(OsisParseError::TooManySegments { count: 4, .. })
        ));
        assert!(matches!(
            OsisReference::parse_strict("Gen 1.2"),
            Err(OsisParseError::InvalidBook { .. })
        ));
    }

    #[test]
    fn test_display_round_trips_compact_form() {
        for text in ["Gen", "Gen.3", "Gen.3.16", "Gen.3.16-18", "1Cor.2.3"] {
            assert_eq!(OsisReference::parse(text).to_string(), text);
        }
    }

    #[test]
    fn test_chapter_key() {
        assert_eq!(OsisReference::parse("Gen.3.16").chapter_key(), "Gen.3");
        assert_eq!(OsisReference::parse("Gen").chapter_key(), "Gen");
    }

    #[test]
    fn test_testament_serde() {
        assert_eq!(serde_json::to_string(&Testament::New).unwrap(), "\"NT\"");
        let t: Testament = serde_json::from_str("\"UNK\"").unwrap();
        assert_eq!(t, Testament::Unknown);
        let t: Testament = serde_json::from_str("\"apocrypha\"").unwrap();
        assert_eq!(t, Testament::Unknown);
    }
}
