//! Ordered request stages with explicit continue/abort control.
//!
//! A [`Pipeline`] runs its stages in order against an [`Exchange`]. The first
//! stage that returns [`Control::Abort`] ends the request with its response;
//! later stages and the handler never run. Headers a stage stamps onto the
//! exchange are copied onto whatever response is finally written, aborted or
//! not.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Decision returned by a stage
pub enum Control {
    Continue,
    Abort(Response),
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Control::Continue => f.write_str("Continue"),
            Control::Abort(response) => write!(f, "Abort({})", response.status()),
        }
    }
}

/// The request in flight plus headers destined for its response
pub struct Exchange {
    request: Request,
    response_headers: HeaderMap,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response_headers: HeaderMap::new(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Sets a header on the eventual response
    pub fn stamp(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn into_parts(self) -> (Request, HeaderMap) {
        (self.request, self.response_headers)
    }
}

/// One step of request processing.
///
/// Stages are synchronous; nothing in front of the handler needs to wait.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, exchange: &mut Exchange) -> Control;
}

#[derive(Default, Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs stages in order, stopping at the first abort.
    pub fn run(&self, exchange: &mut Exchange) -> Control {
        for stage in &self.stages {
            if let Control::Abort(response) = stage.process(exchange) {
                tracing::debug!(
                    stage = stage.name(),
                    status = %response.status(),
                    "request aborted"
                );
                return Control::Abort(response);
            }
        }
        Control::Continue
    }
}

/// Axum adapter: `axum::middleware::from_fn_with_state(pipeline, pipeline::handle)`
pub async fn handle(State(pipeline): State<Arc<Pipeline>>, request: Request, next: Next) -> Response {
    let mut exchange = Exchange::new(request);
    let control = pipeline.run(&mut exchange);
    let (request, stamped) = exchange.into_parts();

    let mut response = match control {
        Control::Abort(response) => response,
        Control::Continue => next.run(request).await,
    };

    for (name, value) in stamped.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
