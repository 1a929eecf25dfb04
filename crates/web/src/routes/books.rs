//! Book endpoints: listing, chapters and chapter navigation.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Serialize;
use tanakh_core::navigation::{self, Location};
use tanakh_core::reader::{self, ChapterView};
use tanakh_core::{Error, books};

use super::NumberingQuery;
use crate::error_handler::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookSummary {
    pub name: String,
    /// Sefaria title, when the book is one of the canonical 39.
    pub english: Option<&'static str>,
    pub chapters: usize,
}

#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<BookSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub current: Location,
    pub previous: Option<Location>,
    pub next: Option<Location>,
}

/// GET /api/books
pub async fn list_books(State(state): State<AppState>) -> Json<BooksResponse> {
    let books: Vec<BookSummary> = state
        .corpus()
        .books()
        .iter()
        .map(|book| BookSummary {
            name: book.name().to_string(),
            english: books::english_name(book.name()),
            chapters: book.chapter_count(),
        })
        .collect();
    Json(BooksResponse {
        total: books.len(),
        books,
    })
}

/// GET /api/books/{book}/chapters/{chapter}
pub async fn get_chapter(
    Path((book, chapter)): Path<(String, usize)>,
    Query(query): Query<NumberingQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<ChapterView>> {
    let book = state.resolve_book(&book);
    let view = reader::render_chapter(
        state.corpus(),
        state.commentary(),
        &book,
        chapter,
        query.mode_or(state.numbering()),
    )?;
    Ok(Json(view))
}

/// GET /api/books/{book}/chapters/{chapter}/navigation
pub async fn get_navigation(
    Path((book, chapter)): Path<(String, usize)>,
    State(state): State<AppState>,
) -> ApiResult<Json<NavigationResponse>> {
    let current = Location::new(state.resolve_book(&book), chapter);
    if !current.exists_in(state.corpus()) {
        return Err(match state.corpus().book(&current.book) {
            Some(_) => Error::chapter_not_found(current.book, chapter),
            None => Error::book_not_found(current.book),
        }
        .into());
    }
    Ok(Json(NavigationResponse {
        previous: navigation::previous_chapter(state.corpus(), &current),
        next: navigation::next_chapter(state.corpus(), &current),
        current,
    }))
}
