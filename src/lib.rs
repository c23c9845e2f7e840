//! Article Generator Backend Library
//!
//! This library provides the Article Generator REST API: a CRUD service over
//! Postgres guarded by an admission pipeline of API key authentication,
//! per-IP rate limiting, and security response headers.

pub mod api;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::Config;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
