//! Repository pattern implementation for the data access layer
//!
//! The `running_articles` table is provisioned by the managed database and
//! is expected to have this shape:
//!
//! ```sql
//! CREATE TABLE running_articles (
//!     id          bigserial PRIMARY KEY,
//!     title       text,
//!     content     text,
//!     created_at  timestamptz NOT NULL DEFAULT now()
//! );
//! ```

use crate::core::error::Result;
use crate::db::manager::DatabaseManager;
use crate::db::models::{Article, ArticleChanges, ArticleFilter, NewArticle};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;

const ARTICLE_COLUMNS: &str = "id, title, content, created_at";

/// Storage interface for articles
///
/// Handlers depend on this trait rather than on the concrete repository so
/// they can be exercised against an in-memory store in tests.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// List articles matching the filter, newest first
    async fn list(&self, filter: &ArticleFilter, limit: i64, offset: i64) -> Result<Vec<Article>>;

    /// Count articles matching the filter
    async fn count(&self, filter: &ArticleFilter) -> Result<i64>;

    /// Find an article by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Create a new article and return the stored row
    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Apply a partial update; returns `None` when the article does not exist
    async fn update(&self, id: i64, changes: ArticleChanges) -> Result<Option<Article>>;

    /// Delete an article; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Probe the underlying storage for connectivity
    async fn ping(&self) -> Result<()>;
}

/// Postgres-backed repository for Article entities
pub struct ArticleRepository {
    db: Arc<DatabaseManager>,
}

impl ArticleRepository {
    /// Create a new ArticleRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

/// Append the creation-date conditions to a statement
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    let mut prefix = " WHERE ";
    if let Some(from) = filter.date_from {
        builder.push(prefix).push("created_at >= ").push_bind(from);
        prefix = " AND ";
    }
    if let Some(to) = filter.date_to {
        builder.push(prefix).push("created_at <= ").push_bind(to);
    }
}

fn list_query(
    filter: &ArticleFilter,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM running_articles",
        ARTICLE_COLUMNS
    ));
    push_filter(&mut builder, filter);
    builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    builder
}

fn count_query(filter: &ArticleFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM running_articles");
    push_filter(&mut builder, filter);
    builder
}

fn update_query(id: i64, changes: &ArticleChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE running_articles SET ");
    {
        let mut fields = builder.separated(", ");
        if let Some(title) = &changes.title {
            fields.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(content) = &changes.content {
            fields
                .push("content = ")
                .push_bind_unseparated(content.clone());
        }
    }
    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {}", ARTICLE_COLUMNS));
    builder
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn list(&self, filter: &ArticleFilter, limit: i64, offset: i64) -> Result<Vec<Article>> {
        let mut query = list_query(filter, limit, offset);
        let articles = query
            .build_query_as::<Article>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(articles)
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<i64> {
        let mut query = count_query(filter);
        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {} FROM running_articles WHERE id = $1",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(article)
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let created = sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO running_articles (title, content) VALUES ($1, $2) RETURNING {}",
            ARTICLE_COLUMNS
        ))
        .bind(article.title)
        .bind(article.content)
        .fetch_one(self.db.pool())
        .await?;

        tracing::debug!(article_id = created.id, "Article created");
        Ok(created)
    }

    async fn update(&self, id: i64, changes: ArticleChanges) -> Result<Option<Article>> {
        // An empty update degenerates to a read
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = update_query(id, &changes);
        let updated = query
            .build_query_as::<Article>()
            .fetch_optional(self.db.pool())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query_scalar::<_, i64>(
            "DELETE FROM running_articles WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        if deleted.is_some() {
            tracing::debug!(article_id = id, "Article deleted");
        }
        Ok(deleted.is_some())
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }
}
