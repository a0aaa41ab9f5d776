use axum::{body::Bytes, extract::State, http::HeaderMap, Extension};

use crate::api::forms::{StatsForm, StatsResponseData};
use crate::app::AppState;
use crate::auth::Claims;
use crate::error::{Error, Kind};
use crate::middleware::{ApiResponse, ApiResult};

const OP: &str = "stats";

/// POST /api/stats - vocabulary counters for the homepage
///
/// Expected Output:
/// ```json
/// {
///   "result": "ok",
///   "data": {
///     "num_words": 0, "num_definitions": 0, "num_undefined_words": 0,
///     "num_phrases": 0, "num_topics": 0, "num_notes": 0,
///     "undefined_words": [], "untagged_words": []
///   }
/// }
/// ```
///
/// Counters stay zero until storage queries back them.
pub async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatsResponseData> {
    serde_json::from_slice::<StatsForm>(&body)
        .map_err(|e| state.reject(Error::new(OP, Kind::BadForm, e, state.meta(&headers))))?;

    tracing::debug!(username = %claims.username, "stats requested");

    Ok(ApiResponse::success(StatsResponseData::default()))
}
