//! Shared, read-only application state.

use std::sync::Arc;

use tanakh_core::books;
use tanakh_core::{CommentaryIndex, Corpus, NumeralMode};

/// Upper bound on search results per request.
pub const DEFAULT_SEARCH_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct AppState {
    corpus: Arc<Corpus>,
    commentary: Arc<CommentaryIndex>,
    numbering: NumeralMode,
    search_limit: usize,
}

impl AppState {
    #[must_use]
    pub fn new(corpus: Corpus, commentary: CommentaryIndex) -> Self {
        Self {
            corpus: Arc::new(corpus),
            commentary: Arc::new(commentary),
            numbering: NumeralMode::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Numbering used when a request does not ask for one.
    #[must_use]
    pub const fn with_numbering(mut self, numbering: NumeralMode) -> Self {
        self.numbering = numbering;
        self
    }

    #[must_use]
    pub const fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub fn commentary(&self) -> &CommentaryIndex {
        &self.commentary
    }

    #[must_use]
    pub const fn numbering(&self) -> NumeralMode {
        self.numbering
    }

    #[must_use]
    pub const fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Corpus key for a book given in Hebrew or English. Unknown names are
    /// returned unchanged so the lookup reports them as not found.
    #[must_use]
    pub fn resolve_book(&self, name: &str) -> String {
        if self.corpus.book(name).is_some() {
            return name.to_string();
        }
        books::resolve(name)
            .map(|book| book.hebrew)
            .filter(|hebrew| self.corpus.book(hebrew).is_some())
            .unwrap_or(name)
            .to_string()
    }
}
