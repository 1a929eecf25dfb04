//! Chapter-to-chapter navigation across book boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;

/// A chapter the reader can be at. `chapter` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub book: String,
    pub chapter: usize,
}

impl Location {
    pub fn new(book: impl Into<String>, chapter: usize) -> Self {
        Self {
            book: book.into(),
            chapter,
        }
    }

    /// Whether the corpus has this book and chapter.
    #[must_use]
    pub fn exists_in(&self, corpus: &Corpus) -> bool {
        corpus
            .book(&self.book)
            .and_then(|book| book.chapter(self.chapter))
            .is_some()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)
    }
}

/// The chapter after `from`: the next chapter of the same book, or the first
/// chapter of the next book. `None` at the end of the corpus or when `from`
/// does not exist.
#[must_use]
pub fn next_chapter(corpus: &Corpus, from: &Location) -> Option<Location> {
    if !from.exists_in(corpus) {
        return None;
    }
    let index = corpus.book_index(&from.book)?;
    let book = corpus.books().get(index)?;

    if from.chapter < book.chapter_count() {
        return Some(Location::new(book.name(), from.chapter + 1));
    }

    corpus
        .books()
        .iter()
        .skip(index + 1)
        .find(|next| next.chapter_count() > 0)
        .map(|next| Location::new(next.name(), 1))
}

/// The chapter before `from`: the previous chapter of the same book, or the
/// last chapter of the previous book. `None` at the start of the corpus or
/// when `from` does not exist.
#[must_use]
pub fn previous_chapter(corpus: &Corpus, from: &Location) -> Option<Location> {
    if !from.exists_in(corpus) {
        return None;
    }
    if from.chapter > 1 {
        return Some(Location::new(from.book.clone(), from.chapter - 1));
    }

    let index = corpus.book_index(&from.book)?;
    corpus
        .books()
        .get(..index)?
        .iter()
        .rev()
        .find(|previous| previous.chapter_count() > 0)
        .map(|previous| Location::new(previous.name(), previous.chapter_count()))
}
