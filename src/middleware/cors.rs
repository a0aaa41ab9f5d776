use axum::{
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::IntoResponse,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::pipeline::{Control, Exchange, Stage};
use crate::config::{AppConfig, ConfigError, Environment};

/// CORS policy for the configured posture.
///
/// Development allows any origin. Production allows only the configured
/// origins, `GET`/`POST`, and a fixed header set. Preflight requests are
/// answered here and never reach authorization.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, ConfigError> {
    match config.environment {
        Environment::Development => Ok(CorsLayer::permissive()),
        Environment::Production => {
            let origins = config.origin_headers()?;
            if origins.is_empty() {
                tracing::warn!("no allowed origins configured; cross-origin requests will be refused");
            }
            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    HeaderName::from_static("x-client-name"),
                    HeaderName::from_static("x-client-version"),
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                ])
                .expose_headers([HeaderName::from_static("x-server-version")]))
        }
    }
}

/// Refuses cross-origin requests from origins outside the production allow-list.
///
/// `CorsLayer` only withholds the allow headers from such requests; this stage
/// answers them with an empty `403` before they reach CORS or any handler.
/// Requests without an `Origin`, or whose origin is the server's own host, pass.
pub struct OriginGate {
    allowed: Vec<String>,
}

impl OriginGate {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    fn is_allowed(&self, origin: &str, headers: &HeaderMap) -> bool {
        self.allowed.iter().any(|o| o == origin) || is_same_origin(origin, headers)
    }
}

impl Stage for OriginGate {
    fn name(&self) -> &'static str {
        "origin-gate"
    }

    fn process(&self, exchange: &mut Exchange) -> Control {
        let Some(origin) = exchange.headers().get(header::ORIGIN) else {
            return Control::Continue;
        };
        let origin = origin.to_str().unwrap_or_default();
        if self.is_allowed(origin, exchange.headers()) {
            return Control::Continue;
        }
        tracing::warn!(origin, "origin not allowed");
        Control::Abort(StatusCode::FORBIDDEN.into_response())
    }
}

fn is_same_origin(origin: &str, headers: &HeaderMap) -> bool {
    let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    origin
        .split_once("://")
        .is_some_and(|(_, authority)| authority == host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SigningKey;
    use axum::{body::Body, extract::Request};

    fn exchange(headers: &[(&'static str, &'static str)]) -> Exchange {
        let mut builder = Request::builder().method(Method::POST).uri("/api/word");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Exchange::new(builder.body(Body::empty()).unwrap())
    }

    fn status(control: Control) -> Option<StatusCode> {
        match control {
            Control::Abort(response) => Some(response.status()),
            Control::Continue => None,
        }
    }

    #[test]
    fn origin_gate_refuses_unlisted_origins() {
        let gate = OriginGate::new(vec!["https://vocab.example".into()]);

        let mut ex = exchange(&[("origin", "https://evil.example")]);
        assert_eq!(status(gate.process(&mut ex)), Some(StatusCode::FORBIDDEN));

        let mut ex = exchange(&[("origin", "https://vocab.example")]);
        assert_eq!(status(gate.process(&mut ex)), None);

        let mut ex = exchange(&[]);
        assert_eq!(status(gate.process(&mut ex)), None);
    }

    #[test]
    fn origin_gate_allows_same_origin() {
        let gate = OriginGate::new(Vec::new());
        let mut ex = exchange(&[("origin", "http://api.example:8080"), ("host", "api.example:8080")]);
        assert_eq!(status(gate.process(&mut ex)), None);

        let mut ex = exchange(&[("origin", "http://other.example"), ("host", "api.example:8080")]);
        assert_eq!(status(gate.process(&mut ex)), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn production_rejects_invalid_origins() {
        let config = AppConfig::production(
            SigningKey::from_secret("k").unwrap(),
            vec!["bad\u{7f}origin".into()],
        );
        assert!(cors_layer(&config).is_err());
    }

    #[test]
    fn both_postures_build() {
        let key = SigningKey::from_secret("k").unwrap();
        assert!(cors_layer(&AppConfig::development(key.clone())).is_ok());
        assert!(cors_layer(&AppConfig::production(key, vec!["https://a.example".into()])).is_ok());
    }
}
