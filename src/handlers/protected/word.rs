use axum::{body::Bytes, extract::State, http::HeaderMap, Extension};

use crate::api::forms::{SaveForm, SaveWordResponseData};
use crate::app::AppState;
use crate::auth::Claims;
use crate::error::{Error, Kind};
use crate::middleware::{ApiResponse, ApiResult};

const OP: &str = "save.word";

/// POST /api/word - accept a word for the authenticated user
pub async fn save_word(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<SaveWordResponseData> {
    let form: SaveForm = serde_json::from_slice(&body)
        .map_err(|e| state.reject(Error::new(OP, Kind::BadForm, e, state.meta(&headers))))?;

    tracing::debug!(username = %claims.username, fields = form.data.len(), "word received");

    Ok(ApiResponse::success(SaveWordResponseData::default()))
}
