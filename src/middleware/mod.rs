pub mod auth;
pub mod content_type;
pub mod cors;
pub mod pipeline;
pub mod response;
pub mod version;

pub use auth::Authorize;
pub use content_type::EnforceContentType;
pub use cors::{cors_layer, OriginGate};
pub use pipeline::{Control, Exchange, Pipeline, Stage};
pub use response::{ApiResponse, ApiResult};
pub use version::VersionStamp;
