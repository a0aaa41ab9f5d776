use std::sync::Arc;

use axum::{
    http::HeaderMap,
    middleware::from_fn_with_state,
    response::Response,
    routing::post,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::headers::MIME_JSON;
use crate::config::{AppConfig, ConfigError};
use crate::error::{Error, Meta};
use crate::handlers;
use crate::middleware::{
    cors_layer, pipeline, Authorize, EnforceContentType, OriginGate, Pipeline, VersionStamp,
};

/// Read-only state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    /// Error metadata for a request handled by this server
    pub fn meta(&self, headers: &HeaderMap) -> Meta {
        Meta::for_request(&self.config.api.version, headers)
    }

    /// Terminal error response honoring the stack exposure setting
    pub fn reject(&self, err: Error) -> Response {
        err.respond(self.config.api.expose_error_stack)
    }
}

/// Stages every request passes through, in order, before CORS
pub fn front_pipeline(config: &Arc<AppConfig>) -> Result<Pipeline, ConfigError> {
    let pipeline = Pipeline::new()
        .stage(VersionStamp::new(config.version_header()?))
        .stage(EnforceContentType::new(MIME_JSON, config.clone()));

    if config.is_production() {
        return Ok(pipeline.stage(OriginGate::new(config.security.cors_origins.clone())));
    }
    Ok(pipeline)
}

/// Stages for the protected `/api` group
pub fn protected_pipeline(config: &Arc<AppConfig>) -> Pipeline {
    Pipeline::new().stage(Authorize::new(config.clone()))
}

/// Build the router.
///
/// Request order: version stamping, content-type enforcement, CORS, then
/// authorization for `/api/*`, then the handler.
pub fn app(config: AppConfig) -> Result<Router, ConfigError> {
    config.validate()?;
    let config = Arc::new(config);
    let state = AppState::new(config.clone());

    let front = Arc::new(front_pipeline(&config)?);
    let protected = Arc::new(protected_pipeline(&config));
    let cors = cors_layer(&config)?;

    let router = Router::new()
        .merge(auth_routes())
        .merge(api_routes().route_layer(from_fn_with_state(protected, pipeline::handle)))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(front, pipeline::handle))
                .layer(cors),
        );

    Ok(router)
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn api_routes() -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/word", post(protected::save_word))
        .route("/api/picture", post(protected::save_picture))
        .route("/api/stats", post(protected::stats))
}
