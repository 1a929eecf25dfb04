//! Nikud-insensitive verse search with highlighted matches.
//!
//! The query and every verse are stripped of nikud before matching. Matches
//! are located on the stripped verse and projected back onto the pointed
//! original through [`StrippedText`], so highlights never cut a letter off
//! from its vowel marks.
//!
//! Results come back in corpus order (books, then chapters, then verses) and
//! are never re-ranked.

use std::borrow::Cow;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::corpus::{Corpus, VerseRef};
use crate::error::Error;
use crate::nikud::{StrippedText, strip_nikud};
use crate::result::Result;

/// Markers placed around every highlighted span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub open: Cow<'static, str>,
    pub close: Cow<'static, str>,
}

impl HighlightStyle {
    /// `<span class="highlight">...</span>`, as rendered by the reader pages.
    #[must_use]
    pub const fn html() -> Self {
        Self {
            open: Cow::Borrowed("<span class=\"highlight\">"),
            close: Cow::Borrowed("</span>"),
        }
    }

    /// ANSI bold for terminals.
    #[must_use]
    pub const fn ansi() -> Self {
        Self {
            open: Cow::Borrowed("\x1b[1m"),
            close: Cow::Borrowed("\x1b[0m"),
        }
    }

    /// No markers at all.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            open: Cow::Borrowed(""),
            close: Cow::Borrowed(""),
        }
    }

    pub fn custom(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: Cow::Owned(open.into()),
            close: Cow::Owned(close.into()),
        }
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::html()
    }
}

/// A matching verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub book: String,
    /// 1-based.
    pub chapter: usize,
    /// 1-based.
    pub verse: usize,
    /// The verse as stored, nikud included.
    pub text: String,
    /// Byte ranges of `text` that matched the query.
    pub spans: Vec<Range<usize>>,
    /// `text` with every span wrapped in highlight markers.
    pub rendered: String,
}

/// A compiled, nikud-free, literal query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    text: String,
    pattern: Regex,
}

impl SearchQuery {
    /// Compile `query`. Blank queries (including queries made only of nikud)
    /// yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the pattern cannot be compiled, for
    /// example when it exceeds the regex size limit.
    pub fn parse(query: &str) -> Result<Option<Self>> {
        let text = strip_nikud(query.trim());
        if text.trim().is_empty() {
            return Ok(None);
        }

        let pattern = RegexBuilder::new(&regex::escape(&text))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidQuery {
                query: query.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(Self { text, pattern }))
    }

    /// The query as matched, nikud removed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Matching byte ranges of `text`, projected onto the original.
    #[must_use]
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        let stripped = StrippedText::new(text);
        self.pattern
            .find_iter(stripped.as_str())
            .filter_map(|m| stripped.to_original(m.range()))
            .filter(|range| !range.is_empty())
            .collect()
    }
}

/// Wrap every span of `text` in the style's markers.
///
/// Spans must be sorted, non-overlapping, and on char boundaries; anything
/// else is skipped.
#[must_use]
pub fn highlight(text: &str, spans: &[Range<usize>], style: &HighlightStyle) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in spans {
        let (Some(before), Some(matched)) = (text.get(cursor..span.start), text.get(span.clone()))
        else {
            continue;
        };
        rendered.push_str(before);
        rendered.push_str(&style.open);
        rendered.push_str(matched);
        rendered.push_str(&style.close);
        cursor = span.end;
    }

    rendered.push_str(text.get(cursor..).unwrap_or_default());
    rendered
}

/// Linear search over the corpus.
#[derive(Debug, Clone, Default)]
pub struct TextSearchEngine {
    style: HighlightStyle,
    limit: Option<usize>,
}

impl TextSearchEngine {
    #[must_use]
    pub const fn new(style: HighlightStyle) -> Self {
        Self { style, limit: None }
    }

    /// Stop after `limit` results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Search the whole corpus.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the query cannot be compiled.
    pub fn search(&self, corpus: &Corpus, query: &str) -> Result<Vec<SearchResult>> {
        self.search_until(corpus, query, || false)
    }

    /// Search, checking `cancelled` before every verse. A cancelled search
    /// returns the results found so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the query cannot be compiled.
    pub fn search_until(
        &self,
        corpus: &Corpus,
        query: &str,
        mut cancelled: impl FnMut() -> bool,
    ) -> Result<Vec<SearchResult>> {
        let Some(query) = SearchQuery::parse(query)? else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for verse in corpus.verses() {
            if self.limit.is_some_and(|limit| results.len() >= limit) || cancelled() {
                break;
            }
            if let Some(result) = self.match_verse(&query, verse) {
                results.push(result);
            }
        }

        debug!(query = query.as_str(), results = results.len(), "Search finished");
        Ok(results)
    }

    fn match_verse(&self, query: &SearchQuery, verse: VerseRef<'_>) -> Option<SearchResult> {
        let spans = query.find_spans(verse.text);
        if spans.is_empty() {
            return None;
        }
        Some(SearchResult {
            book: verse.book.to_string(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text.to_string(),
            rendered: highlight(verse.text, &spans, &self.style),
            spans,
        })
    }
}

/// Search with HTML highlight markers and no limit.
///
/// # Errors
///
/// Returns [`Error::InvalidQuery`] if the query cannot be compiled.
pub fn search(corpus: &Corpus, query: &str) -> Result<Vec<SearchResult>> {
    TextSearchEngine::default().search(corpus, query)
}
