// Layered API error types
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::api::headers::{HEADER_CLIENT_NAME, HEADER_CLIENT_VERSION, HEADER_SERVER_VERSION};

/// Closed classification of a failure.
///
/// Each kind maps to exactly one display name and one HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    #[default]
    Unknown,
    BadForm,
    BadRequest,
    DatabaseFailure,
    InternalError,
    InvalidToken,
    Unauthorized,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Unknown,
        Kind::BadForm,
        Kind::BadRequest,
        Kind::DatabaseFailure,
        Kind::InternalError,
        Kind::InvalidToken,
        Kind::Unauthorized,
    ];

    /// Display name used in the `error` field of the wire envelope
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Unknown => "unknown",
            Kind::BadForm => "bad form",
            Kind::BadRequest => "bad request",
            Kind::DatabaseFailure => "database failure",
            Kind::InternalError => "internal error",
            Kind::InvalidToken => "invalid token",
            Kind::Unauthorized => "unauthorized",
        }
    }

    /// Transport status for this kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            Kind::BadForm | Kind::BadRequest => StatusCode::BAD_REQUEST,
            Kind::InvalidToken | Kind::Unauthorized => StatusCode::UNAUTHORIZED,
            Kind::DatabaseFailure | Kind::InternalError | Kind::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Label naming the operation that raised or forwarded an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Op(Cow<'static, str>);

impl Op {
    pub const fn new(label: &'static str) -> Self {
        Op(Cow::Borrowed(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Op {
    fn from(label: &'static str) -> Self {
        Op::new(label)
    }
}

impl From<String> for Op {
    fn from(label: String) -> Self {
        Op(Cow::Owned(label))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request metadata attached to an error (header/field name to value).
///
/// Keys are kept sorted so rendered diagnostics are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta(BTreeMap<String, String>);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meta for an inbound request: the running server version plus the
    /// client identification headers when the client sent them.
    pub fn for_request(server_version: &str, headers: &HeaderMap) -> Self {
        let mut meta = Meta::new();
        meta.set(HEADER_SERVER_VERSION, server_version);
        for name in [HEADER_CLIENT_NAME, HEADER_CLIENT_VERSION] {
            if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
                meta.set(name, value);
            }
        }
        meta
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Meta(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Terminal error carrying only a message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

/// What a layered error wraps: another layered error, or an opaque terminal one.
#[derive(Debug)]
pub enum Cause {
    Layered(Box<Error>),
    Opaque(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Cause {
    pub fn opaque<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Cause::Opaque(Box::new(err))
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Layered(inner) => fmt::Display::fmt(inner, f),
            Cause::Opaque(inner) => fmt::Display::fmt(inner, f),
        }
    }
}

impl From<Error> for Cause {
    fn from(err: Error) -> Self {
        Cause::Layered(Box::new(err))
    }
}

impl From<Message> for Cause {
    fn from(err: Message) -> Self {
        Cause::opaque(err)
    }
}

impl From<jsonwebtoken::errors::Error> for Cause {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Cause::opaque(err)
    }
}

impl From<sqlx::Error> for Cause {
    fn from(err: sqlx::Error) -> Self {
        Cause::opaque(err)
    }
}

impl From<serde_json::Error> for Cause {
    fn from(err: serde_json::Error) -> Self {
        Cause::opaque(err)
    }
}

/// A failure tagged with the operation that raised it, its kind, request
/// metadata, and an optional wrapped cause.
///
/// Chains are built by wrapping one `Error` in another; `ops()` and `stack()`
/// walk the chain from the outermost layer inward.
#[derive(Debug)]
pub struct Error {
    op: Op,
    kind: Kind,
    meta: Meta,
    cause: Option<Cause>,
}

impl Error {
    pub fn new(op: impl Into<Op>, kind: Kind, cause: impl Into<Cause>, meta: Meta) -> Self {
        Self {
            op: op.into(),
            kind,
            meta,
            cause: Some(cause.into()),
        }
    }

    /// An error with no underlying cause
    pub fn bare(op: impl Into<Op>, kind: Kind, meta: Meta) -> Self {
        Self {
            op: op.into(),
            kind,
            meta,
            cause: None,
        }
    }

    pub fn from_message(
        op: impl Into<Op>,
        kind: Kind,
        message: impl Into<String>,
        meta: Meta,
    ) -> Self {
        Self::new(op, kind, Message(message.into()), meta)
    }

    /// Wraps `maybe` when it holds an error, otherwise yields `None`.
    pub fn wrap_if_present<C: Into<Cause>>(
        op: impl Into<Op>,
        kind: Kind,
        maybe: Option<C>,
        meta: Meta,
    ) -> Option<Self> {
        maybe.map(|cause| Self::new(op, kind, cause, meta))
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Layers of the chain, outermost first, stopping at the first opaque cause.
    pub fn layers(&self) -> Layers<'_> {
        Layers { next: Some(self) }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.layers().map(|layer| layer.op.clone()).collect()
    }

    pub fn stack(&self) -> Vec<String> {
        self.layers().map(ToString::to_string).collect()
    }

    /// Renders the error envelope with the kind's status code.
    ///
    /// When `expose_stack` is false the `stack` field is serialized empty.
    pub fn respond(self, expose_stack: bool) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = %self.kind, ops = ?self.ops(), "{}", self);
        } else {
            tracing::warn!(kind = %self.kind, ops = ?self.ops(), "{}", self);
        }

        let body = ErrorEnvelope {
            result: crate::api::forms::RESULT_ERROR,
            data: WireError {
                error: &self,
                expose_stack,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub struct Layers<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = match &current.cause {
            Some(Cause::Layered(inner)) => Some(inner.as_ref()),
            Some(Cause::Opaque(_)) | None => None,
        };
        Some(current)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.kind)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        if !self.meta.is_empty() {
            write!(f, " ({})", self.meta)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(Cause::Layered(inner)) => Some(inner.as_ref()),
            Some(Cause::Opaque(inner)) => Some(inner.as_ref()),
            None => None,
        }
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireError {
            error: self,
            expose_stack: true,
        }
        .serialize(serializer)
    }
}

struct WireError<'a> {
    error: &'a Error,
    expose_stack: bool,
}

impl Serialize for WireError<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stack = if self.expose_stack {
            self.error.stack()
        } else {
            Vec::new()
        };
        let mut state = serializer.serialize_struct("Error", 3)?;
        state.serialize_field("error", &self.error.kind)?;
        state.serialize_field("ops", &self.error.ops())?;
        state.serialize_field("stack", &stack)?;
        state.end()
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    result: &'static str,
    data: WireError<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn meta() -> Meta {
        [("X-Server-Version", "1.2.3"), ("X-Client-Name", "web")]
            .into_iter()
            .collect()
    }

    #[test]
    fn every_kind_has_name_and_status() {
        let expected = [
            (Kind::Unknown, "unknown", 500),
            (Kind::BadForm, "bad form", 400),
            (Kind::BadRequest, "bad request", 400),
            (Kind::DatabaseFailure, "database failure", 500),
            (Kind::InternalError, "internal error", 500),
            (Kind::InvalidToken, "invalid token", 401),
            (Kind::Unauthorized, "unauthorized", 401),
        ];
        assert_eq!(expected.len(), Kind::ALL.len());
        for (kind, name, status) in expected {
            assert_eq!(kind.name(), name);
            assert_eq!(kind.status_code().as_u16(), status);
        }
        assert_eq!(Kind::default(), Kind::Unknown);
    }

    #[test]
    fn wrap_if_present_skips_absent_errors() {
        let none: Option<Message> = None;
        assert!(Error::wrap_if_present("login", Kind::BadForm, none, Meta::new()).is_none());

        let err = Error::wrap_if_present(
            "login",
            Kind::BadForm,
            Some(Message("missing username".into())),
            Meta::new(),
        )
        .unwrap();
        assert_eq!(err.kind(), Kind::BadForm);
        match err.cause() {
            Some(Cause::Opaque(inner)) => assert_eq!(inner.to_string(), "missing username"),
            other => panic!("unexpected cause: {:?}", other),
        }
    }

    #[test]
    fn chain_traversal_is_outermost_first() {
        let root = Error::from_message("postgres.open", Kind::DatabaseFailure, "refused", Meta::new());
        let mid = Error::new("storage", Kind::DatabaseFailure, root, Meta::new());
        let top = Error::new("save.word", Kind::DatabaseFailure, mid, meta());

        let ops: Vec<String> = top.ops().iter().map(|op| op.to_string()).collect();
        assert_eq!(ops, vec!["save.word", "storage", "postgres.open"]);
        assert_eq!(top.stack().len(), 3);
        assert_eq!(
            top.stack()[2],
            "postgres.open: database failure: refused"
        );
    }

    #[test]
    fn error_without_cause_has_single_layer() {
        let err = Error::bare("middleware.authorization", Kind::InvalidToken, Meta::new());
        assert_eq!(err.ops().len(), 1);
        assert_eq!(err.stack(), vec!["middleware.authorization: invalid token"]);
    }

    #[test]
    fn duplicate_ops_are_preserved() {
        let inner = Error::from_message("login", Kind::BadForm, "x", Meta::new());
        let outer = Error::new("login", Kind::BadForm, inner, Meta::new());
        assert_eq!(outer.ops(), vec![Op::new("login"), Op::new("login")]);
    }

    #[test]
    fn meta_renders_without_trailing_delimiter() {
        assert_eq!(Meta::new().to_string(), "");
        assert_eq!(
            meta().to_string(),
            "X-Client-Name: web, X-Server-Version: 1.2.3"
        );

        let err = Error::from_message("login", Kind::BadForm, "bad", meta());
        assert_eq!(
            err.to_string(),
            "login: bad form: bad (X-Client-Name: web, X-Server-Version: 1.2.3)"
        );
    }

    #[test]
    fn meta_can_be_enriched_after_construction() {
        let mut err = Error::bare("login", Kind::BadForm, Meta::new());
        err.meta_mut().set("X-Client-Version", "9");
        assert_eq!(err.meta().get("X-Client-Version"), Some("9"));
    }

    #[test]
    fn serializes_to_wire_shape() {
        let inner = Error::from_message("inner", Kind::DatabaseFailure, "boom", Meta::new());
        let outer = Error::new("outer", Kind::DatabaseFailure, inner, Meta::new());

        let value = serde_json::to_value(&outer).unwrap();
        assert_eq!(value["error"], json!("database failure"));
        assert_eq!(value["ops"], json!(["outer", "inner"]));
        let stack = value["stack"].as_array().unwrap();
        assert_eq!(stack.len(), outer.stack().len());
        assert_eq!(stack[1], json!("inner: database failure: boom"));

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn hidden_stack_keeps_field_names() {
        let err = Error::from_message("login", Kind::BadForm, "bad", Meta::new());
        let value = serde_json::to_value(WireError {
            error: &err,
            expose_stack: false,
        })
        .unwrap();
        assert_eq!(value["stack"], Value::Array(vec![]));
        assert_eq!(value["ops"], json!(["login"]));
    }

    #[test]
    fn meta_for_request_skips_absent_client_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-client-name", "ios".parse().unwrap());
        let meta = Meta::for_request("0.1.0", &headers);
        assert_eq!(meta.get(HEADER_SERVER_VERSION), Some("0.1.0"));
        assert_eq!(meta.get(HEADER_CLIENT_NAME), Some("ios"));
        assert_eq!(meta.get(HEADER_CLIENT_VERSION), None);
    }
}
