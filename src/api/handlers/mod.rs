pub mod articles;
pub mod system;

pub use articles::*;
pub use system::*;

use crate::db::repository::ArticleStore;
use std::sync::Arc;

/// Shared application state injected into handlers
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleStore>,
}
