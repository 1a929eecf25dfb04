//! Search endpoint: GET /api/search?q=&numbering=&limit=

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tanakh_core::reader::{self, SearchHit};
use tanakh_core::{NumeralMode, TextSearchEngine};
use tracing::debug;

use crate::error_handler::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub numbering: Option<NumeralMode>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    /// True when the limit cut the results short.
    pub truncated: bool,
    pub results: Vec<SearchHit>,
}

/// GET /api/search
///
/// Results carry HTML highlight markup and references in the requested
/// numbering. A blank query returns no results.
pub async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<SearchResponse>> {
    let limit = params
        .limit
        .map_or(state.search_limit(), |limit| limit.min(state.search_limit()));
    // One extra result tells a cut-off search from an exact fit.
    let engine = TextSearchEngine::default().with_limit(limit.saturating_add(1));
    let mut results = engine.search(state.corpus(), &params.q)?;
    let truncated = results.len() > limit;
    results.truncate(limit);
    debug!(query = %params.q, results = results.len(), truncated, "Search request");

    let hits = reader::annotate_results(
        results,
        state.commentary(),
        params.numbering.unwrap_or(state.numbering()),
    );
    Ok(Json(SearchResponse {
        query: params.q,
        total: hits.len(),
        truncated,
        results: hits,
    }))
}
