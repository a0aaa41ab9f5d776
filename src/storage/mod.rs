//! Persistence boundary. Handlers do not query storage yet; the server only
//! opens and closes it around its lifetime.

pub mod postgres;

use async_trait::async_trait;

use crate::error::Error;

pub use postgres::Postgres;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn open(&mut self) -> Result<(), Error>;

    /// Closing a store that was never opened is not an error
    async fn close(&mut self) -> Result<(), Error>;
}
