use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue,
};

use super::pipeline::{Control, Exchange, Stage};
use crate::config::AppConfig;
use crate::error::{Error, Kind, Meta};

const OP: &str = "middleware.enforce-content-type";

/// Rejects requests whose `Accept` header is not exactly the expected media
/// type, before any body is read. Surviving requests get a matching
/// `Content-Type` on their response.
pub struct EnforceContentType {
    media_type: &'static str,
    config: Arc<AppConfig>,
}

impl EnforceContentType {
    pub fn new(media_type: &'static str, config: Arc<AppConfig>) -> Self {
        Self { media_type, config }
    }
}

impl Stage for EnforceContentType {
    fn name(&self) -> &'static str {
        "enforce-content-type"
    }

    fn process(&self, exchange: &mut Exchange) -> Control {
        let accepted = exchange
            .headers()
            .get(ACCEPT)
            .is_some_and(|v| v.as_bytes() == self.media_type.as_bytes());

        if !accepted {
            let err = Error::from_message(
                OP,
                Kind::BadRequest,
                format!("Accept header must be set to {}", self.media_type),
                Meta::for_request(&self.config.api.version, exchange.headers()),
            );
            return Control::Abort(err.respond(self.config.api.expose_error_stack));
        }

        exchange.stamp(CONTENT_TYPE, HeaderValue::from_static(self.media_type));
        Control::Continue
    }
}
