use axum::http::StatusCode;

/// POST /auth/refresh - placeholder, answers 200 with an empty body
pub async fn refresh() -> StatusCode {
    // TODO: re-issue a token for a still-valid bearer once refresh semantics are settled
    StatusCode::OK
}
