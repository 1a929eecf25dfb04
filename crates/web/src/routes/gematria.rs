//! Gematria endpoint: GET /api/gematria/{n}

use axum::{extract::Path, response::Json};
use serde::Serialize;
use tanakh_core::gematria;
use tanakh_core::NumeralMode;

use crate::error_handler::ApiResult;

#[derive(Debug, Serialize)]
pub struct GematriaResponse {
    pub number: i64,
    pub hebrew: String,
}

/// GET /api/gematria/{n} - 400 for anything below 1.
pub async fn convert(Path(n): Path<i64>) -> ApiResult<Json<GematriaResponse>> {
    let hebrew = gematria::format_integer(n, NumeralMode::Hebrew)?;
    Ok(Json(GematriaResponse { number: n, hebrew }))
}
