//! Article request/response models

use crate::db::models::{Article, ArticleChanges, NewArticle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for POST /api/v1/articles
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<CreateArticleRequest> for NewArticle {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
        }
    }
}

/// Request body for PUT /api/v1/articles/:id; omitted fields are untouched
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<UpdateArticleRequest> for ArticleChanges {
    fn from(req: UpdateArticleRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
        }
    }
}

/// A single article as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
            created_at: article.created_at,
        }
    }
}

/// Paginated article listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub items: Vec<ArticleResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Query parameters for GET /api/v1/articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Filter articles created from this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    pub date_from: Option<String>,
    /// Filter articles created until this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    pub date_to: Option<String>,
}
