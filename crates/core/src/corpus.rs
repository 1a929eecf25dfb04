//! The in-memory Bible text: books, chapters and verses.
//!
//! The corpus is an ordered list of books. Its JSON form is an object keyed by
//! book name whose key order *is* the book order, so deserialization walks the
//! object in document order instead of going through a hash map.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::error::Error;
use crate::result::Result;

/// One book and its chapters; each chapter is a dense list of verses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    name: String,
    chapters: Vec<Vec<String>>,
}

impl Book {
    pub fn new(name: impl Into<String>, chapters: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            chapters,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn chapters(&self) -> &[Vec<String>] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Verses of a 1-based chapter.
    #[must_use]
    pub fn chapter(&self, chapter: usize) -> Option<&[String]> {
        chapter
            .checked_sub(1)
            .and_then(|index| self.chapters.get(index))
            .map(Vec::as_slice)
    }
}

/// A verse together with its 1-based location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseRef<'a> {
    pub book: &'a str,
    pub chapter: usize,
    pub verse: usize,
    pub text: &'a str,
}

/// Ordered collection of books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    books: Vec<Book>,
}

impl Corpus {
    /// Build a corpus, rejecting duplicate book names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateBook`] if a name appears twice.
    pub fn from_books(books: Vec<Book>) -> Result<Self> {
        let mut corpus = Self::default();
        for book in books {
            corpus.push_book(book)?;
        }
        Ok(corpus)
    }

    /// Append a book at the end of the book order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateBook`] if the name is already present.
    pub fn push_book(&mut self, book: Book) -> Result<()> {
        if self.book(book.name()).is_some() {
            return Err(Error::DuplicateBook { book: book.name });
        }
        self.books.push(book);
        Ok(())
    }

    /// Parse the `{book: [[verse, ...], ...]}` JSON layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] for malformed JSON or duplicate books.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    /// Load a corpus from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        let corpus = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            books = corpus.len(),
            verses = corpus.verse_count(),
            "Loaded corpus"
        );
        Ok(corpus)
    }

    /// Pretty JSON in book order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    /// Write the corpus as JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::directory_creation_failed(parent, e.to_string()))?;
        }
        fs::write(path, self.to_json_string()?)
            .map_err(|e| Error::file_write_failed(path, e.to_string()))
    }

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn book_names(&self) -> impl Iterator<Item = &str> {
        self.books.iter().map(Book::name)
    }

    #[must_use]
    pub fn book(&self, name: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.name == name)
    }

    /// Position of a book in the book order.
    #[must_use]
    pub fn book_index(&self, name: &str) -> Option<usize> {
        self.books.iter().position(|book| book.name == name)
    }

    #[must_use]
    pub fn chapter_count(&self, book: &str) -> Option<usize> {
        self.book(book).map(Book::chapter_count)
    }

    /// Verses of a 1-based chapter.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown book or chapter.
    pub fn chapter(&self, book: &str, chapter: usize) -> Result<&[String]> {
        self.book(book)
            .ok_or_else(|| Error::book_not_found(book))?
            .chapter(chapter)
            .ok_or_else(|| Error::chapter_not_found(book, chapter))
    }

    /// Text of a 1-based verse.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown book, chapter or verse.
    pub fn verse(&self, book: &str, chapter: usize, verse: usize) -> Result<&str> {
        self.chapter(book, chapter)?
            .get(verse.wrapping_sub(1))
            .map(String::as_str)
            .ok_or_else(|| Error::verse_not_found(book, chapter, verse))
    }

    /// Every verse in traversal order: books, then chapters, then verses.
    pub fn verses(&self) -> impl Iterator<Item = VerseRef<'_>> {
        self.books.iter().flat_map(|book| {
            book.chapters.iter().zip(1..).flat_map(move |(verses, chapter)| {
                verses.iter().zip(1..).map(move |(text, verse)| VerseRef {
                    book: &book.name,
                    chapter,
                    verse,
                    text,
                })
            })
        })
    }

    #[must_use]
    pub fn verse_count(&self) -> usize {
        self.books
            .iter()
            .flat_map(|book| book.chapters.iter())
            .map(Vec::len)
            .sum()
    }
}

impl Serialize for Corpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.books.len()))?;
        for book in &self.books {
            map.serialize_entry(&book.name, &book.chapters)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Corpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CorpusVisitor)
    }
}

struct CorpusVisitor;

impl<'de> Visitor<'de> for CorpusVisitor {
    type Value = Corpus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping book names to lists of chapters")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Corpus, A::Error> {
        let mut corpus = Corpus::default();
        while let Some((name, chapters)) = access.next_entry::<String, Vec<Vec<String>>>()? {
            corpus
                .push_book(Book::new(name, chapters))
                .map_err(de::Error::custom)?;
        }
        Ok(corpus)
    }
}
