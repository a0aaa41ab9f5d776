use axum::http::{HeaderName, HeaderValue};

use super::pipeline::{Control, Exchange, Stage};
use crate::api::headers::HEADER_SERVER_VERSION;

/// Stamps `X-Server-Version` on every response. Never aborts.
pub struct VersionStamp {
    version: HeaderValue,
}

impl VersionStamp {
    pub fn new(version: HeaderValue) -> Self {
        Self { version }
    }
}

impl Stage for VersionStamp {
    fn name(&self) -> &'static str {
        "version"
    }

    fn process(&self, exchange: &mut Exchange) -> Control {
        exchange.stamp(
            HeaderName::from_static("x-server-version"),
            self.version.clone(),
        );
        Control::Continue
    }
}
