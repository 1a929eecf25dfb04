//! Commentary endpoint: GET /api/commentary/{book}/{chapter}/{verse}

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Serialize;
use tanakh_core::reader::{self, CommentaryStatus, CommentaryView};

use super::NumberingQuery;
use crate::error_handler::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CommentaryResponse {
    pub available: bool,
    #[serde(flatten)]
    pub view: CommentaryView,
}

/// Missing commentary is a 200 with `available: false`; only a verse that is
/// not in the corpus is a 404.
pub async fn get_commentary(
    Path((book, chapter, verse)): Path<(String, usize, usize)>,
    Query(query): Query<NumberingQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<CommentaryResponse>> {
    let book = state.resolve_book(&book);
    let view = reader::render_commentary(
        state.corpus(),
        state.commentary(),
        &book,
        chapter,
        verse,
        query.mode_or(state.numbering()),
    )?;
    Ok(Json(CommentaryResponse {
        available: view.status == CommentaryStatus::Found,
        view,
    }))
}
