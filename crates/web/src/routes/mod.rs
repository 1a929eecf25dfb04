//! REST API routes
//!
//! ## Route Structure
//!
//! - `GET /health` - Liveness check
//! - `GET /api/books` - Books with chapter counts
//! - `GET /api/books/{book}/chapters/{chapter}` - A rendered chapter
//! - `GET /api/books/{book}/chapters/{chapter}/navigation` - Neighbouring chapters
//! - `GET /api/search?q=` - Nikud-insensitive search
//! - `GET /api/gematria/{n}` - A number in Hebrew numerals
//! - `GET /api/commentary/{book}/{chapter}/{verse}` - Rashi on a verse
//!
//! Every route that shows chapter or verse numbers takes an optional
//! `numbering=hebrew|arabic` query parameter.

use axum::{Router, routing::get};
use serde::Deserialize;
use tanakh_core::NumeralMode;

use crate::state::AppState;

pub mod books;
pub mod commentary;
pub mod gematria;
pub mod search;

/// `?numbering=` shared by the reading routes.
#[derive(Debug, Default, Deserialize)]
pub struct NumberingQuery {
    pub numbering: Option<NumeralMode>,
}

impl NumberingQuery {
    /// Requested numbering, or the server default.
    #[must_use]
    pub fn mode_or(&self, default: NumeralMode) -> NumeralMode {
        self.numbering.unwrap_or(default)
    }
}

/// Create the API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/books", get(books::list_books))
        .route("/api/books/{book}/chapters/{chapter}", get(books::get_chapter))
        .route(
            "/api/books/{book}/chapters/{chapter}/navigation",
            get(books::get_navigation),
        )
        .route("/api/search", get(search::search))
        .route("/api/gematria/{n}", get(gematria::convert))
        .route(
            "/api/commentary/{book}/{chapter}/{verse}",
            get(commentary::get_commentary),
        )
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
