use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// The fixed security header set attached to every response
///
/// Header names are disjoint, so attachment order does not matter.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains",
    ),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
];

/// Security headers middleware
///
/// Unconditionally attaches the fixed header set to every outgoing response,
/// including rejections produced by the admission checks, and strips the
/// Server header.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();

    for (name, value) in SECURITY_HEADERS {
        parts
            .headers
            .insert(*name, HeaderValue::from_static(value));
    }

    parts.headers.remove("server");

    Response::from_parts(parts, body)
}
