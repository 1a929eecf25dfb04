//! # Tanakh Core
//!
//! Reading, numbering and searching the Hebrew Bible.
//!
//! - [`gematria`] renders chapter and verse numbers as Hebrew numerals
//! - [`search`] finds verses regardless of nikud and highlights the matches
//! - [`corpus`] and [`commentary`] hold the text and Rashi's commentary
//! - [`reader`] ties them together with persisted reader state
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`](Result). Optional data
//! (commentary, saved state) degrades through [`ResultExt`] instead of failing.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod books;
pub mod commentary;
pub mod corpus;
mod error;
pub mod gematria;
pub mod navigation;
pub mod nikud;
pub mod reader;
mod result;
pub mod search;

pub use commentary::{CommentaryIndex, CommentaryLookup};
pub use corpus::{Book, Corpus, VerseRef};
pub use error::Error;
pub use gematria::NumeralMode;
pub use navigation::Location;
pub use reader::{
    ChapterView, CommentaryStatus, CommentaryView, JsonFileStore, MemoryStore, Reader,
    ReaderState, SearchHit, StateStore, VerseView,
};
pub use result::{Result, ResultExt};
pub use search::{HighlightStyle, SearchQuery, SearchResult, TextSearchEngine};
