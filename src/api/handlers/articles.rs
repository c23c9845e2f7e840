use crate::api::handlers::AppState;
use crate::api::models::{
    ArticleListResponse, ArticleResponse, CreateArticleRequest, ListArticlesQuery,
    UpdateArticleRequest,
};
use crate::core::error::{AppError, Result};
use crate::db::models::ArticleFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Parse a date filter value.
///
/// Accepts `YYYY-MM-DD` (interpreted as midnight) or `YYYY-MM-DDTHH:MM:SS`,
/// with an optional trailing `Z`.
fn parse_filter_date(value: &str, param: &str) -> Result<DateTime<Utc>> {
    let value = value.trim().trim_end_matches('Z');

    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(AppError::InvalidRequest(format!(
        "Invalid {} format. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
        param
    )))
}

/// Map a storage failure to an opaque 500 with an operation-specific detail
fn storage_error(err: AppError, detail: &'static str) -> AppError {
    tracing::error!(error = %err, "{}", detail);
    AppError::Internal(detail.to_string())
}

/// Handler for GET /api/v1/articles - list articles with pagination and
/// optional date filtering
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::InvalidRequest(
            "page must be greater than or equal to 1".to_string(),
        ));
    }

    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::InvalidRequest(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let filter = ArticleFilter {
        date_from: params
            .date_from
            .as_deref()
            .map(|v| parse_filter_date(v, "date_from"))
            .transpose()?,
        date_to: params
            .date_to
            .as_deref()
            .map(|v| parse_filter_date(v, "date_to"))
            .transpose()?,
    };

    let offset = i64::from(page - 1) * i64::from(page_size);
    let articles = state
        .articles
        .list(&filter, i64::from(page_size), offset)
        .await
        .map_err(|e| storage_error(e, "Failed to fetch articles"))?;
    let total = state
        .articles
        .count(&filter)
        .await
        .map_err(|e| storage_error(e, "Failed to fetch articles"))?;

    Ok(Json(ArticleListResponse {
        items: articles.into_iter().map(ArticleResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

/// Handler for GET /api/v1/articles/:id - get article by ID
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let article = state
        .articles
        .find_by_id(id)
        .await
        .map_err(|e| storage_error(e, "Failed to fetch article"))?
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

    Ok(Json(ArticleResponse::from(article)))
}

/// Handler for POST /api/v1/articles - create a new article
pub async fn create_article(
    State(state): State<AppState>,
    Json(req): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse> {
    let created = state
        .articles
        .create(req.into())
        .await
        .map_err(|e| storage_error(e, "Failed to create article"))?;

    Ok((StatusCode::CREATED, Json(ArticleResponse::from(created))))
}

/// Handler for PUT /api/v1/articles/:id - partially update an article
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse> {
    let updated = state
        .articles
        .update(id, req.into())
        .await
        .map_err(|e| storage_error(e, "Failed to update article"))?
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

    Ok(Json(ArticleResponse::from(updated)))
}

/// Handler for DELETE /api/v1/articles/:id - delete an article
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let deleted = state
        .articles
        .delete(id)
        .await
        .map_err(|e| storage_error(e, "Failed to delete article"))?;

    if !deleted {
        return Err(AppError::NotFound("Article not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::testing::{state_with_store, InMemoryStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use chrono::TimeZone;
    use tower::util::ServiceExt; // For oneshot method

    fn app(store: std::sync::Arc<InMemoryStore>) -> Router {
        Router::new()
            .route("/api/v1/articles", get(list_articles).post(create_article))
            .route(
                "/api/v1/articles/:id",
                get(get_article).put(update_article).delete(delete_article),
            )
            .with_state(state_with_store(store))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_parse_filter_date_formats() {
        assert_eq!(
            parse_filter_date("2025-12-20", "date_from").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_filter_date("2025-12-20T13:45:30", "date_from").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 20, 13, 45, 30).unwrap()
        );
        assert_eq!(
            parse_filter_date("2025-12-20T13:45:30Z", "date_from").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 20, 13, 45, 30).unwrap()
        );
        assert!(parse_filter_date("20-12-2025", "date_from").is_err());
        assert!(parse_filter_date("not-a-date", "date_from").is_err());
    }

    #[tokio::test]
    async fn test_list_empty_store_uses_default_pagination() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .uri("/api/v1/articles")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 0);
        assert_eq!(body["total"], 0);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 10);
    }

    #[tokio::test]
    async fn test_list_pagination_and_ordering() {
        let store = InMemoryStore::new();
        for day in 1..=15 {
            store.seed(
                &format!("article-{}", day),
                Utc.with_ymd_and_hms(2025, 12, day, 12, 0, 0).unwrap(),
            );
        }

        let request = Request::builder()
            .uri("/api/v1/articles?page=2&page_size=10")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        let body = body_json(response).await;

        // Newest first: page 2 holds the five oldest
        assert_eq!(body["total"], 15);
        assert_eq!(body["items"].as_array().unwrap().len(), 5);
        assert_eq!(body["items"][0]["title"], "article-5");
        assert_eq!(body["items"][4]["title"], "article-1");
    }

    #[tokio::test]
    async fn test_list_date_filtering() {
        let store = InMemoryStore::new();
        store.seed("old", Utc.with_ymd_and_hms(2025, 12, 10, 8, 0, 0).unwrap());
        store.seed("mid", Utc.with_ymd_and_hms(2025, 12, 20, 8, 0, 0).unwrap());
        store.seed("new", Utc.with_ymd_and_hms(2025, 12, 28, 8, 0, 0).unwrap());

        let request = Request::builder()
            .uri("/api/v1/articles?date_from=2025-12-15&date_to=2025-12-27")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        let body = body_json(response).await;

        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["title"], "mid");
    }

    #[tokio::test]
    async fn test_list_invalid_date_returns_400() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .uri("/api/v1/articles?date_from=28-12-2025")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["detail"],
            "Invalid date_from format. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
        );
    }

    #[tokio::test]
    async fn test_list_page_size_out_of_range_returns_400() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .uri("/api/v1/articles?page_size=101")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_returns_201_with_row() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/articles")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"title": "First run", "content": "10k in the rain"}"#,
            ))
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["title"], "First run");
        assert_eq!(body["content"], "10k in the rain");
        assert!(body["id"].as_i64().unwrap() >= 1);
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_get_missing_article_returns_404() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .uri("/api/v1/articles/42")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Article not found");
    }

    #[tokio::test]
    async fn test_update_only_touches_provided_fields() {
        let store = InMemoryStore::new();
        let id = store.seed("original", Utc::now());

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/articles/{}", id))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"content": "updated content"}"#))
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["title"], "original");
        assert_eq!(body["content"], "updated content");
    }

    #[tokio::test]
    async fn test_update_missing_article_returns_404() {
        let store = InMemoryStore::new();

        let request = Request::builder()
            .method("PUT")
            .uri("/api/v1/articles/42")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title": "nope"}"#))
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let store = InMemoryStore::new();
        let id = store.seed("to delete", Utc::now());
        let app = app(store);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/articles/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/articles/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
