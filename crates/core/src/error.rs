//! Core error types for the Tanakh reader.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for reader operations.
#[derive(Debug, Error)]
pub enum Error {
    // Numerals
    #[error("no gematria exists for {value}: numerals start at 1")]
    InvalidNumeral { value: i64 },

    // Search
    #[error("invalid search query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    // Corpus lookups
    #[error("book not found: {book}")]
    BookNotFound { book: String },

    #[error("chapter {chapter} not found in {book}")]
    ChapterNotFound { book: String, chapter: usize },

    #[error("verse {verse} not found in {book} {chapter}")]
    VerseNotFound {
        book: String,
        chapter: usize,
        verse: usize,
    },

    #[error("book '{book}' appears more than once in the corpus")]
    DuplicateBook { book: String },

    // I/O errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("failed to write file '{path}': {reason}")]
    FileWriteFailed { path: PathBuf, reason: String },

    #[error("failed to create directory '{path}': {reason}")]
    DirectoryCreationFailed { path: PathBuf, reason: String },

    // Parsing errors
    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid numeral error.
    pub const fn invalid_numeral(value: i64) -> Self {
        Self::InvalidNumeral { value }
    }

    /// Create a book lookup error.
    pub fn book_not_found(book: impl Into<String>) -> Self {
        Self::BookNotFound { book: book.into() }
    }

    /// Create a chapter lookup error.
    pub fn chapter_not_found(book: impl Into<String>, chapter: usize) -> Self {
        Self::ChapterNotFound {
            book: book.into(),
            chapter,
        }
    }

    /// Create a verse lookup error.
    pub fn verse_not_found(book: impl Into<String>, chapter: usize, verse: usize) -> Self {
        Self::VerseNotFound {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a file write error.
    pub fn file_write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a directory creation error.
    pub fn directory_creation_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse_failed(reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            reason: reason.into(),
        }
    }

    /// Whether the error means "the requested location does not exist".
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BookNotFound { .. } | Self::ChapterNotFound { .. } | Self::VerseNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::book_not_found("Foo").is_not_found());
        assert!(Error::chapter_not_found("Foo", 3).is_not_found());
        assert!(Error::verse_not_found("Foo", 3, 4).is_not_found());
        assert!(!Error::invalid_numeral(0).is_not_found());
        assert!(!Error::json_parse_failed("bad").is_not_found());
    }

    #[test]
    fn test_messages_name_the_location() {
        let message = Error::verse_not_found("בראשית", 1, 99).to_string();
        assert!(message.contains("בראשית"));
        assert!(message.contains("99"));
    }
}
