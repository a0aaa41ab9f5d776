// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{body::Bytes, extract::State, http::HeaderMap};

use crate::api::forms::{LoginForm, LoginResponseData};
use crate::app::AppState;
use crate::auth::{self, OP_LOGIN};
use crate::error::{Error, Kind};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/login - exchange credentials for a bearer token
///
/// Expected Input:
/// ```json
/// { "data": { "username": "string", "password": "string" } }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "result": "ok", "data": { "expiry": 1700000300, "token": "eyJhbGciOiJIUzI1NiI..." } }
/// ```
///
/// The request `Content-Type` is not consulted; the body is always read as JSON.
/// Credentials are only checked for shape; any well-formed pair is accepted.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<LoginResponseData> {
    let meta = state.meta(&headers);

    let form: LoginForm = serde_json::from_slice(&body)
        .map_err(|e| state.reject(Error::new(OP_LOGIN, Kind::BadForm, e, meta.clone())))?;

    if let Some(err) =
        Error::wrap_if_present(OP_LOGIN, Kind::BadForm, form.validate().err(), meta.clone())
    {
        return Err(state.reject(err));
    }

    let security = &state.config.security;
    let issued = auth::issue(
        &form.data.username,
        &security.signing_key,
        chrono::Utc::now().timestamp(),
        security.token_ttl,
        meta,
    )
    .map_err(|e| state.reject(e))?;

    tracing::info!(
        username = %issued.claims.username,
        expires_at = issued.claims.expires_at,
        "token issued"
    );

    Ok(ApiResponse::success(LoginResponseData {
        expiry: issued.claims.expires_at,
        token: issued.token,
    }))
}
