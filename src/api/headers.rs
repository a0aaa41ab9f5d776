//! Wire-level header names shared by the middleware and handlers.

pub const HEADER_CLIENT_NAME: &str = "X-Client-Name";
pub const HEADER_CLIENT_VERSION: &str = "X-Client-Version";
pub const HEADER_SERVER_VERSION: &str = "X-Server-Version";

/// The only media type the API speaks
pub const MIME_JSON: &str = "application/json";

/// Version of the running build, stamped on every response.
///
/// Set `VOCABKING_VERSION` at compile time to override the package version.
pub const VERSION: &str = match option_env!("VOCABKING_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
