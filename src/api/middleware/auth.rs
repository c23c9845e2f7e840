use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Default HTTP header name carrying the API key
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Paths reachable without an API key.
///
/// These also bypass rate limiting: the health probe and the documentation
/// endpoints must stay reachable even when a client has exhausted its
/// budget. Matching is by exact path.
pub const EXEMPT_PATHS: &[&str] = &["/", "/docs", "/redoc", "/openapi.json", "/api/v1/health"];

/// Check whether a request path is exempt from admission checks
pub fn is_exempt_path(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// API key configuration injected into request extensions by the router
#[derive(Clone, Debug)]
pub struct ApiKeyConfig {
    key: String,
    header: String,
}

/// Outcome of validating a request against the configured API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Authorized,
    MissingKey,
    InvalidKey,
}

impl ApiKeyConfig {
    /// Create a new ApiKeyConfig
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Whether API key enforcement is active.
    ///
    /// An empty secret disables enforcement entirely; this is the documented
    /// way to run without authentication during development.
    pub fn enforced(&self) -> bool {
        !self.key.is_empty()
    }

    /// Validate a request path and header set against the configured key.
    ///
    /// Exempt paths are authorized unconditionally. For everything else the
    /// header value must match the secret byte-for-byte.
    pub fn validate(&self, path: &str, headers: &HeaderMap) -> KeyOutcome {
        if is_exempt_path(path) {
            return KeyOutcome::Authorized;
        }

        if !self.enforced() {
            return KeyOutcome::Authorized;
        }

        match headers.get(self.header.as_str()) {
            None => KeyOutcome::MissingKey,
            Some(value) if value.as_bytes() == self.key.as_bytes() => KeyOutcome::Authorized,
            Some(_) => KeyOutcome::InvalidKey,
        }
    }
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    /// Required API key header is absent
    MissingKey,
    /// Header present but does not match the configured secret
    InvalidKey,
    /// API key configuration not found in request extensions
    ConfigurationError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingKey => {
                let body = Json(json!({
                    "detail": "API key required. Please provide X-API-Key header."
                }));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response.headers_mut().insert(
                    "WWW-Authenticate",
                    axum::http::HeaderValue::from_static("ApiKey"),
                );
                response
            }
            AuthError::InvalidKey => {
                let body = Json(json!({
                    "detail": "Invalid API key."
                }));
                (StatusCode::FORBIDDEN, body).into_response()
            }
            AuthError::ConfigurationError => {
                let body = Json(json!({
                    "detail": "API key authentication is not configured."
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// API key authentication middleware
///
/// This middleware:
/// - Lets requests to exempt paths through without any check
/// - Lets everything through when no secret is configured
/// - Short-circuits with 401 when the key header is missing
/// - Short-circuits with 403 when the key does not match
///
/// Rejected requests never reach the rate limiter, so they consume no
/// rate-limit budget.
pub async fn api_key_middleware(request: Request, next: Next) -> Result<Response, AuthError> {
    // Extract the API key configuration from request extensions (injected by the router)
    let config = request
        .extensions()
        .get::<ApiKeyConfig>()
        .cloned()
        .ok_or(AuthError::ConfigurationError)?;

    let path = request.uri().path().to_string();

    match config.validate(&path, request.headers()) {
        KeyOutcome::Authorized => Ok(next.run(request).await),
        KeyOutcome::MissingKey => {
            tracing::warn!(path = %path, "API key missing from request");
            Err(AuthError::MissingKey)
        }
        KeyOutcome::InvalidKey => {
            tracing::warn!(path = %path, "Invalid API key attempt");
            Err(AuthError::InvalidKey)
        }
    }
}
