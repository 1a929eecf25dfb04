//! The reader controller: owns the corpus, the commentary and the persisted
//! reader state (last visited chapter and numbering mode).
//!
//! State is created once from the [`StateStore`] and only changes through the
//! controller's methods, each of which persists the new state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commentary::{CommentaryIndex, CommentaryLookup};
use crate::corpus::Corpus;
use crate::error::Error;
use crate::gematria::{self, NumeralMode};
use crate::navigation::{self, Location};
use crate::result::{Result, ResultExt};
use crate::search::{SearchResult, TextSearchEngine};

/// Book opened when nothing else is known.
pub const DEFAULT_BOOK: &str = "בראשית";

/// Chapter opened when nothing else is known.
pub const DEFAULT_CHAPTER: usize = 1;

/// Persisted reader preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderState {
    pub last_visit: Location,
    #[serde(default)]
    pub numbering: NumeralMode,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            last_visit: Location::new(DEFAULT_BOOK, DEFAULT_CHAPTER),
            numbering: NumeralMode::default(),
        }
    }
}

/// Where reader state lives between sessions.
pub trait StateStore: Send {
    /// Previously saved state, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if stored state exists but cannot be read.
    fn load(&self) -> Result<Option<ReaderState>>;

    /// Replace the saved state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&mut self, state: &ReaderState) -> Result<()>;
}

/// State kept as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<ReaderState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::file_read_failed(&self.path, e.to_string()))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    fn save(&mut self, state: &ReaderState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::directory_creation_failed(parent, e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(state).map_err(|e| Error::json_parse_failed(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| Error::file_write_failed(&self.path, e.to_string()))
    }
}

/// State kept only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Option<ReaderState>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    #[must_use]
    pub const fn with_state(state: ReaderState) -> Self {
        Self { state: Some(state) }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<ReaderState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &ReaderState) -> Result<()> {
        self.state = Some(state.clone());
        Ok(())
    }
}

/// One verse of a rendered chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseView {
    pub number: usize,
    pub label: String,
    pub text: String,
    pub has_commentary: bool,
}

/// A chapter ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterView {
    pub book: String,
    pub chapter: usize,
    pub chapter_label: String,
    /// `<book> <chapter label>`.
    pub title: String,
    pub verses: Vec<VerseView>,
}

/// Render a chapter with verse labels and commentary markers.
///
/// # Errors
///
/// Returns a not-found error for an unknown book or chapter.
pub fn render_chapter(
    corpus: &Corpus,
    commentary: &CommentaryIndex,
    book: &str,
    chapter: usize,
    mode: NumeralMode,
) -> Result<ChapterView> {
    let verses = corpus
        .chapter(book, chapter)?
        .iter()
        .zip(1..)
        .map(|(text, number)| VerseView {
            number,
            label: gematria::label(number, mode),
            text: text.clone(),
            has_commentary: commentary.has_commentary(book, chapter, number),
        })
        .collect();

    let chapter_label = gematria::label(chapter, mode);
    Ok(ChapterView {
        book: book.to_string(),
        chapter,
        title: format!("{book} {chapter_label}"),
        chapter_label,
        verses,
    })
}

/// Whether commentary was found, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryStatus {
    Found,
    UnknownBook,
    NoneForVerse,
}

/// Commentary for one verse, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentaryView {
    /// `<book> <chapter>:<verse>` in the current numbering.
    pub reference: String,
    pub status: CommentaryStatus,
    pub fragments: Vec<String>,
}

/// Look up commentary for a verse that must exist in the corpus.
///
/// # Errors
///
/// Returns a not-found error if the verse is not in the corpus. Missing
/// commentary is reported through [`CommentaryStatus`], not as an error.
pub fn render_commentary(
    corpus: &Corpus,
    commentary: &CommentaryIndex,
    book: &str,
    chapter: usize,
    verse: usize,
    mode: NumeralMode,
) -> Result<CommentaryView> {
    corpus.verse(book, chapter, verse)?;

    let lookup = commentary.for_verse(book, chapter, verse);
    let status = match lookup {
        CommentaryLookup::Found(_) => CommentaryStatus::Found,
        CommentaryLookup::UnknownBook => CommentaryStatus::UnknownBook,
        CommentaryLookup::NoneForVerse => CommentaryStatus::NoneForVerse,
    };

    Ok(CommentaryView {
        reference: format!("{book} {}", gematria::reference(chapter, verse, mode)),
        status,
        fragments: lookup.fragments().to_vec(),
    })
}

/// A search result with its display reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// `<book> <chapter>:<verse>` in the current numbering.
    pub reference: String,
    pub has_commentary: bool,
    #[serde(flatten)]
    pub result: SearchResult,
}

/// Attach display references and commentary markers to search results.
#[must_use]
pub fn annotate_results(
    results: Vec<SearchResult>,
    commentary: &CommentaryIndex,
    mode: NumeralMode,
) -> Vec<SearchHit> {
    results
        .into_iter()
        .map(|result| SearchHit {
            reference: format!(
                "{} {}",
                result.book,
                gematria::reference(result.chapter, result.verse, mode)
            ),
            has_commentary: commentary.has_commentary(&result.book, result.chapter, result.verse),
            result,
        })
        .collect()
}

/// Owns the reading session.
pub struct Reader {
    corpus: Corpus,
    commentary: CommentaryIndex,
    store: Box<dyn StateStore>,
    state: ReaderState,
}

impl Reader {
    /// Start a session with the built-in defaults.
    pub fn new(corpus: Corpus, commentary: CommentaryIndex, store: Box<dyn StateStore>) -> Self {
        Self::with_defaults(corpus, commentary, store, ReaderState::default())
    }

    /// Start a session; `defaults` apply when nothing usable was persisted.
    ///
    /// A stored location that no longer exists in the corpus falls back to the
    /// default location, then to the first chapter of the first book.
    pub fn with_defaults(
        corpus: Corpus,
        commentary: CommentaryIndex,
        store: Box<dyn StateStore>,
        defaults: ReaderState,
    ) -> Self {
        let mut state = store
            .load()
            .or_default_logged(None)
            .unwrap_or_else(|| defaults.clone());

        if !state.last_visit.exists_in(&corpus) {
            warn!(location = %state.last_visit, "Stored location not in corpus, falling back");
            state.last_visit = Some(defaults.last_visit)
                .filter(|location| location.exists_in(&corpus))
                .or_else(|| {
                    corpus
                        .book_names()
                        .next()
                        .map(|book| Location::new(book, DEFAULT_CHAPTER))
                })
                .unwrap_or(state.last_visit);
        }

        info!(location = %state.last_visit, numbering = %state.numbering, "Reader ready");
        Self {
            corpus,
            commentary,
            store,
            state,
        }
    }

    #[must_use]
    pub const fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub const fn commentary(&self) -> &CommentaryIndex {
        &self.commentary
    }

    #[must_use]
    pub const fn state(&self) -> &ReaderState {
        &self.state
    }

    #[must_use]
    pub const fn last_visit(&self) -> &Location {
        &self.state.last_visit
    }

    #[must_use]
    pub const fn numbering(&self) -> NumeralMode {
        self.state.numbering
    }

    /// Open a chapter and remember it as the last visit.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown book or chapter; the last
    /// visit is left unchanged in that case.
    pub fn open(&mut self, book: &str, chapter: usize) -> Result<ChapterView> {
        let view = render_chapter(
            &self.corpus,
            &self.commentary,
            book,
            chapter,
            self.state.numbering,
        )?;
        self.state.last_visit = Location::new(book, chapter);
        self.persist();
        debug!(book, chapter, "Opened chapter");
        Ok(view)
    }

    /// Reopen the last visited chapter.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the corpus has no chapters at all.
    pub fn open_last_visit(&mut self) -> Result<ChapterView> {
        let Location { book, chapter } = self.state.last_visit.clone();
        self.open(&book, chapter)
    }

    /// Move to the next chapter. `None` at the end of the corpus.
    ///
    /// # Errors
    ///
    /// Returns an error if the target chapter cannot be rendered.
    pub fn next(&mut self) -> Result<Option<ChapterView>> {
        match navigation::next_chapter(&self.corpus, &self.state.last_visit) {
            Some(location) => self.open(&location.book, location.chapter).map(Some),
            None => Ok(None),
        }
    }

    /// Move to the previous chapter. `None` at the start of the corpus.
    ///
    /// # Errors
    ///
    /// Returns an error if the target chapter cannot be rendered.
    pub fn previous(&mut self) -> Result<Option<ChapterView>> {
        match navigation::previous_chapter(&self.corpus, &self.state.last_visit) {
            Some(location) => self.open(&location.book, location.chapter).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_numbering(&mut self, mode: NumeralMode) {
        self.state.numbering = mode;
        self.persist();
    }

    /// Switch between gematria and decimal numbering; returns the new mode.
    pub fn toggle_numbering(&mut self) -> NumeralMode {
        self.set_numbering(self.state.numbering.toggled());
        self.state.numbering
    }

    /// Format a number in the current numbering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNumeral`] for zero.
    pub fn format_number(&self, n: u32) -> Result<String> {
        gematria::format(n, self.state.numbering)
    }

    /// Search the corpus; references use the current numbering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the query cannot be compiled.
    pub fn search(&self, query: &str, engine: &TextSearchEngine) -> Result<Vec<SearchHit>> {
        let results = engine.search(&self.corpus, query)?;
        Ok(annotate_results(
            results,
            &self.commentary,
            self.state.numbering,
        ))
    }

    /// Commentary for a verse.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the verse is not in the corpus.
    pub fn commentary_for(&self, book: &str, chapter: usize, verse: usize) -> Result<CommentaryView> {
        render_commentary(
            &self.corpus,
            &self.commentary,
            book,
            chapter,
            verse,
            self.state.numbering,
        )
    }

    fn persist(&mut self) {
        self.store
            .save(&self.state)
            .or_default_logged(());
    }
}
