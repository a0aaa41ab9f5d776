use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, Method};

use super::pipeline::{Control, Exchange, Stage};
use crate::auth::{self, OP_AUTHORIZATION};
use crate::config::AppConfig;
use crate::error::{Error, Kind, Meta};

/// Bearer token authorization for the protected route group.
///
/// On success the verified [`auth::Claims`] are inserted into the request
/// extensions for handlers to pick up.
pub struct Authorize {
    config: Arc<AppConfig>,
}

impl Authorize {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl Stage for Authorize {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn process(&self, exchange: &mut Exchange) -> Control {
        if is_preflight_request(exchange.request().method(), exchange.headers()) {
            return Control::Continue;
        }

        let meta = Meta::for_request(&self.config.api.version, exchange.headers());
        let expose_stack = self.config.api.expose_error_stack;

        let Some(token) = bearer_token(exchange.headers()) else {
            let err = Error::from_message(
                OP_AUTHORIZATION,
                Kind::BadRequest,
                "authorization header is missing or malformed",
                meta,
            );
            return Control::Abort(err.respond(expose_stack));
        };

        let now = chrono::Utc::now().timestamp();
        match auth::verify(token, &self.config.security.signing_key, now, meta) {
            Ok(claims) => {
                tracing::debug!(username = %claims.username, "request authorized");
                exchange.request_mut().extensions_mut().insert(claims);
                Control::Continue
            }
            Err(err) => Control::Abort(err.respond(expose_stack)),
        }
    }
}

/// An `OPTIONS` request carrying both CORS preflight headers
pub fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key("access-control-request-method")
        && headers.contains_key("access-control-request-headers")
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The header must split into exactly two whitespace-separated fields, the
/// first being the literal `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}
