//! Per-verse commentary (Rashi) keyed by English book title.
//!
//! Commentary is optional data: a missing file, an unknown book or an empty
//! verse slot all mean "no commentary", never an error for the reader.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::books;
use crate::error::Error;
use crate::result::{Result, ResultExt};

/// Chapters → verses → fragments, all 0-based.
pub type BookCommentary = Vec<Vec<Vec<String>>>;

/// The JSON as delivered by Sefaria: any level may be `null`.
type RawBookCommentary = Vec<Option<Vec<Option<Vec<Option<String>>>>>>;

/// Outcome of a commentary lookup for a verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentaryLookup<'a> {
    Found(&'a [String]),
    /// The book has no English mapping or no commentary at all.
    UnknownBook,
    /// The book is covered but this verse has nothing.
    NoneForVerse,
}

impl<'a> CommentaryLookup<'a> {
    /// Fragments, empty unless found.
    #[must_use]
    pub const fn fragments(&self) -> &'a [String] {
        match *self {
            Self::Found(fragments) => fragments,
            Self::UnknownBook | Self::NoneForVerse => &[],
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Commentary for any number of books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, RawBookCommentary>")]
pub struct CommentaryIndex {
    #[serde(flatten)]
    books: BTreeMap<String, BookCommentary>,
}

impl From<BTreeMap<String, RawBookCommentary>> for CommentaryIndex {
    fn from(raw: BTreeMap<String, RawBookCommentary>) -> Self {
        let books = raw
            .into_iter()
            .map(|(name, chapters)| (name, normalize(chapters)))
            .collect();
        Self { books }
    }
}

fn normalize(chapters: RawBookCommentary) -> BookCommentary {
    chapters
        .into_iter()
        .map(|verses| {
            verses
                .unwrap_or_default()
                .into_iter()
                .map(|fragments| fragments.unwrap_or_default().into_iter().flatten().collect())
                .collect()
        })
        .collect()
}

impl CommentaryIndex {
    /// An index with no commentary.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `{"Genesis": [[["fragment", ...], ...], ...], ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] for malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    /// Load commentary from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        let index = Self::from_json_str(&content)?;
        info!(path = %path.display(), books = index.book_count(), "Loaded commentary");
        Ok(index)
    }

    /// Load commentary, degrading to an empty index when the source is
    /// missing or unreadable.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "Commentary file not found, continuing without it");
            return Self::empty();
        }
        Self::load(path).or_default_logged(Self::empty())
    }

    /// Pretty JSON keyed by English title.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.books).map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    /// Add or replace the commentary of one book.
    pub fn insert_book(&mut self, english: impl Into<String>, chapters: BookCommentary) {
        self.books.insert(english.into(), chapters);
    }

    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    #[must_use]
    pub fn contains_book(&self, english: &str) -> bool {
        self.books.contains_key(english)
    }

    /// Fragments at 0-based indices; empty slots report `None`.
    #[must_use]
    pub fn lookup(&self, english: &str, chapter: usize, verse: usize) -> Option<&[String]> {
        self.books
            .get(english)?
            .get(chapter)?
            .get(verse)
            .map(Vec::as_slice)
            .filter(|fragments| !fragments.is_empty())
    }

    /// Commentary for a verse addressed by Hebrew title and 1-based numbers.
    #[must_use]
    pub fn for_verse(&self, hebrew_book: &str, chapter: usize, verse: usize) -> CommentaryLookup<'_> {
        let Some(english) = books::english_name(hebrew_book).filter(|e| self.contains_book(e))
        else {
            return CommentaryLookup::UnknownBook;
        };

        let found = chapter
            .checked_sub(1)
            .zip(verse.checked_sub(1))
            .and_then(|(chapter, verse)| self.lookup(english, chapter, verse));

        found.map_or(CommentaryLookup::NoneForVerse, CommentaryLookup::Found)
    }

    #[must_use]
    pub fn has_commentary(&self, hebrew_book: &str, chapter: usize, verse: usize) -> bool {
        self.for_verse(hebrew_book, chapter, verse).is_found()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const SAMPLE: &str = r#"{
        "Genesis": [
            [["<b>בראשית</b> - אמר רבי יצחק", "ד\"א בראשית"], [], null],
            null,
            [[null, "ויכלו"]]
        ]
    }"#;

    #[test]
    fn test_lookup_found() {
        let index = CommentaryIndex::from_json_str(SAMPLE).unwrap();
        let fragments = index.lookup("Genesis", 0, 0).unwrap();
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn test_nulls_and_empties_mean_none() {
        let index = CommentaryIndex::from_json_str(SAMPLE).unwrap();
        assert!(index.lookup("Genesis", 0, 1).is_none());
        assert!(index.lookup("Genesis", 0, 2).is_none());
        assert!(index.lookup("Genesis", 1, 0).is_none());
        assert!(index.lookup("Genesis", 9, 0).is_none());
        assert_eq!(index.lookup("Genesis", 2, 0).unwrap(), ["ויכלו".to_string()]);
    }

    #[test]
    fn test_for_verse_uses_hebrew_titles() {
        let index = CommentaryIndex::from_json_str(SAMPLE).unwrap();
        assert!(index.for_verse("בראשית", 1, 1).is_found());
        assert_eq!(index.for_verse("בראשית", 1, 2), CommentaryLookup::NoneForVerse);
        assert_eq!(index.for_verse("בראשית", 0, 1), CommentaryLookup::NoneForVerse);
        assert_eq!(index.for_verse("שמות", 1, 1), CommentaryLookup::UnknownBook);
        assert_eq!(index.for_verse("לא ספר", 1, 1), CommentaryLookup::UnknownBook);
        assert!(index.has_commentary("בראשית", 3, 1));
    }

    #[test]
    fn test_empty_index_reports_nothing() {
        let index = CommentaryIndex::empty();
        assert!(index.is_empty());
        assert!(!index.has_commentary("בראשית", 1, 1));
        assert!(index.for_verse("בראשית", 1, 1).fragments().is_empty());
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = CommentaryIndex::load_or_empty(&dir.path().join("missing.json"));
        assert!(missing.is_empty());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        assert!(CommentaryIndex::load_or_empty(&broken).is_empty());

        let good = dir.path().join("rashi.json");
        fs::write(&good, SAMPLE).unwrap();
        assert_eq!(CommentaryIndex::load_or_empty(&good).book_count(), 1);
    }

    #[test]
    fn test_insert_and_serialize() {
        let mut index = CommentaryIndex::empty();
        index.insert_book("Exodus", vec![vec![vec!["ואלה".to_string()]]]);
        let json = index.to_json_string().unwrap();
        let reparsed = CommentaryIndex::from_json_str(&json).unwrap();
        assert_eq!(reparsed, index);
        assert!(reparsed.has_commentary("שמות", 1, 1));
    }
}
