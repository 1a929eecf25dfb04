//! The scrape loop: walk every chapter of a book through a [`TextSource`],
//! retrying transient failures, and assemble the corpus and commentary files.
//!
//! Runs are sequential and resumable: books already in the cache are read
//! back instead of fetched again.

use std::time::Duration;

use tanakh_core::books::BookName;
use tanakh_core::commentary::BookCommentary;
use tanakh_core::{Book, CommentaryIndex, Corpus};
use tracing::{error, info, warn};

use crate::cache::CacheDir;
use crate::error::Result;
use crate::retry::{RetryPolicy, retry};
use crate::source::{ChapterPayload, TextNode, TextSource, chapter_in};

/// Pause between two requests to the source.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Commentator scraped alongside the text by default.
pub const RASHI: &str = "Rashi";

/// What a [`Scraper::scrape_all`] run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Books fetched from the source during this run.
    pub fetched: Vec<String>,
    /// Books read back from the cache.
    pub cached: Vec<String>,
    /// Books that failed; they are missing from the assembled corpus.
    pub failed: Vec<String>,
    /// Books with commentary in the assembled index.
    pub commentary_books: usize,
}

impl ScrapeSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Scraper<S> {
    source: S,
    policy: RetryPolicy,
    request_delay: Duration,
}

impl<S: TextSource> Scraper<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: RetryPolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    async fn fetch(&self, reference: &str) -> Result<ChapterPayload> {
        retry(&self.policy, reference, || self.source.fetch(reference)).await
    }

    /// Fetch `<book_ref>.1`, then follow `next` while it stays in the book.
    /// Chapters the source skips come back as [`TextNode::Empty`].
    async fn walk_chapters(&self, book_ref: &str) -> Result<Vec<TextNode>> {
        let mut chapters = Vec::new();
        let mut chapter = 1;
        loop {
            let payload = self.fetch(&format!("{book_ref}.{chapter}")).await?;
            chapters.resize(chapter - 1, TextNode::Empty);
            chapters.push(payload.he);

            match payload
                .next
                .as_deref()
                .and_then(|next| chapter_in(next, book_ref))
            {
                Some(next) if next > chapter => {
                    chapter = next;
                    tokio::time::sleep(self.request_delay).await;
                }
                _ => break,
            }
        }
        Ok(chapters)
    }

    /// Every chapter of a book, one string per verse.
    ///
    /// # Errors
    ///
    /// Returns the first error that survives the retry policy.
    pub async fn scrape_book(&self, book: &BookName) -> Result<Vec<Vec<String>>> {
        let chapters: Vec<Vec<String>> = self
            .walk_chapters(book.english)
            .await?
            .into_iter()
            .map(TextNode::into_verses)
            .collect();
        info!(book = book.hebrew, chapters = chapters.len(), "Scraped book");
        Ok(chapters)
    }

    /// A commentator's notes on a book: chapters, verses, fragments.
    ///
    /// # Errors
    ///
    /// Returns the first error that survives the retry policy.
    pub async fn scrape_commentary(
        &self,
        commentator: &str,
        book: &BookName,
    ) -> Result<BookCommentary> {
        let book_ref = format!("{commentator} on {}", book.english);
        let chapters: BookCommentary = self
            .walk_chapters(&book_ref)
            .await?
            .into_iter()
            .map(TextNode::into_fragments)
            .collect();
        info!(book = book.hebrew, commentator, chapters = chapters.len(), "Scraped commentary");
        Ok(chapters)
    }

    async fn book_cached_or_fetched(
        &self,
        book: &BookName,
        cache: &CacheDir,
        summary: &mut ScrapeSummary,
    ) -> Result<Vec<Vec<String>>> {
        let path = cache.book_path(book.english);
        if let Some(chapters) = cache.read_json(&path).await? {
            summary.cached.push(book.hebrew.to_string());
            return Ok(chapters);
        }
        let chapters = self.scrape_book(book).await?;
        cache.write_json(&path, &chapters).await?;
        summary.fetched.push(book.hebrew.to_string());
        Ok(chapters)
    }

    async fn commentary_cached_or_fetched(
        &self,
        commentator: &str,
        book: &BookName,
        cache: &CacheDir,
    ) -> Result<BookCommentary> {
        let path = cache.commentary_path(commentator, book.english);
        if let Some(chapters) = cache.read_json(&path).await? {
            return Ok(chapters);
        }
        let chapters = self.scrape_commentary(commentator, book).await?;
        cache.write_json(&path, &chapters).await?;
        Ok(chapters)
    }

    /// Scrape `books` in order into `cache`, then write the assembled corpus
    /// and, when a commentator is given, the assembled commentary index.
    ///
    /// A book that fails is logged, recorded in the summary and left out; the
    /// next run picks it up again. Missing commentary for a book is not a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the assembled files cannot be written.
    pub async fn scrape_all(
        &self,
        books: &[BookName],
        cache: &CacheDir,
        commentator: Option<&str>,
    ) -> Result<ScrapeSummary> {
        let mut summary = ScrapeSummary::default();
        let mut corpus = Corpus::default();
        let mut commentary = CommentaryIndex::empty();

        for book in books {
            match self.book_cached_or_fetched(book, cache, &mut summary).await {
                Ok(chapters) => corpus.push_book(Book::new(book.hebrew, chapters))?,
                Err(e) => {
                    error!(book = book.hebrew, error = %e, "Failed to scrape book");
                    summary.failed.push(book.hebrew.to_string());
                    continue;
                }
            }

            let Some(commentator) = commentator else {
                continue;
            };
            match self.commentary_cached_or_fetched(commentator, book, cache).await {
                Ok(chapters) => commentary.insert_book(book.english, chapters),
                Err(e) => warn!(book = book.hebrew, commentator, error = %e, "No commentary"),
            }
        }

        cache.write_json(&cache.bible_path(), &corpus).await?;
        if let Some(commentator) = commentator {
            summary.commentary_books = commentary.book_count();
            cache
                .write_json(&cache.commentary_index_path(commentator), &commentary)
                .await?;
        }

        info!(
            fetched = summary.fetched.len(),
            cached = summary.cached.len(),
            failed = summary.failed.len(),
            "Scrape finished"
        );
        Ok(summary)
    }
}
