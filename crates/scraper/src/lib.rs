//! Tanakh scraper
//!
//! Fetches Bible text and commentary from Sefaria chapter by chapter, with a
//! fixed retry count and delay, and caches everything as JSON for offline use.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

mod cache;
mod error;
mod retry;
mod scrape;
mod sefaria;
mod source;

pub use cache::{BIBLE_FILE, CacheDir};
pub use error::{Error, ErrorCategory, Result};
pub use retry::{Backoff, RetryPolicy, RetryState, retry};
pub use scrape::{DEFAULT_REQUEST_DELAY, RASHI, ScrapeSummary, Scraper};
pub use sefaria::{DEFAULT_BASE_URL, SefariaClient};
pub use source::{ChapterPayload, TextNode, TextSource, chapter_in};
