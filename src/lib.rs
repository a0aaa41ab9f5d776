pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod storage;

pub use app::{app, AppState};
pub use error::{Error, Kind, Meta, Op};
