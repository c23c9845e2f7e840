//! Database module
//!
//! This module provides database access functionality including:
//! - Postgres connection pool management
//! - Repository pattern implementation
//! - Row models
//!
//! Schema and migrations are owned by the managed database, not by this
//! service.

pub mod manager;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::{Article, ArticleChanges, ArticleFilter, NewArticle};
pub use repository::{ArticleRepository, ArticleStore};
