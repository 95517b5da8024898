/// Livestream Service Library
///
/// Reactions and ranking statistics for the livestreaming platform.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: store rows and response records
/// - `services`: ranking, statistics assembly, reaction fetch/insert
/// - `db`: `Store` abstraction and its PostgreSQL implementation
/// - `middleware`: session verification
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
