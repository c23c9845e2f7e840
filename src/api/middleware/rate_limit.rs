use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::api::middleware::auth::is_exempt_path;
use crate::core::clock::{Clock, SystemClock};

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const HOUR_WINDOW: Duration = Duration::from_secs(3600);

/// Rate limiter using fixed-window counting
///
/// Each client IP owns two counters, one per window length. A counter only
/// ever covers `[window_start, window_start + window)`; once the current
/// time passes the boundary the counter resets to zero and a fresh window is
/// anchored at the current instant, so stale windows never bleed into new
/// ones. Check and increment happen as one unit under the write lock: a
/// request is either admitted with both counters charged, or rejected with
/// neither touched.
#[derive(Clone)]
pub struct RateLimiter {
    /// Shared state containing per-IP window counters
    state: Arc<RwLock<HashMap<IpAddr, ClientCounters>>>,
    per_minute: u32,
    per_hour: u32,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

/// A single fixed-window counter
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

impl WindowCounter {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    /// Reset the counter if the current time has passed the window boundary
    fn roll(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.window_start) >= window {
            self.count = 0;
            self.window_start = now;
        }
    }

    /// Seconds until this window resets, rounded up; at least 1
    fn seconds_until_reset(&self, now: Instant, window: Duration) -> u64 {
        let remaining = window.saturating_sub(now.duration_since(self.window_start));
        (remaining.as_secs_f64().ceil() as u64).max(1)
    }
}

/// Per-identity counter pair
#[derive(Debug, Clone, Copy)]
struct ClientCounters {
    minute: WindowCounter,
    hour: WindowCounter,
    last_seen: Instant,
}

impl ClientCounters {
    fn new(now: Instant) -> Self {
        Self {
            minute: WindowCounter::new(now),
            hour: WindowCounter::new(now),
            last_seen: now,
        }
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admitted {
        remaining_minute: u32,
        remaining_hour: u32,
    },
    MinuteExceeded {
        retry_after_secs: u64,
    },
    HourExceeded {
        retry_after_secs: u64,
    },
}

impl RateLimiter {
    /// Create a new rate limiter on the system clock
    pub fn new(per_minute: u32, per_hour: u32, enabled: bool) -> Self {
        Self::with_clock(per_minute, per_hour, enabled, Arc::new(SystemClock))
    }

    /// Create a rate limiter with an injected clock
    pub fn with_clock(per_minute: u32, per_hour: u32, enabled: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            per_minute,
            per_hour,
            enabled,
            clock,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute
    }

    pub fn per_hour(&self) -> u32 {
        self.per_hour
    }

    /// Check whether a request from the given identity is admitted, and
    /// charge both counters if so.
    ///
    /// The minute limit is checked before the hour limit. A rejected request
    /// consumes no budget.
    pub async fn check_and_increment(&self, ip: IpAddr) -> RateLimitDecision {
        let now = self.clock.now();
        let mut clients = self.state.write().await;

        let entry = clients.entry(ip).or_insert_with(|| ClientCounters::new(now));
        entry.last_seen = now;
        entry.minute.roll(now, MINUTE_WINDOW);
        entry.hour.roll(now, HOUR_WINDOW);

        if entry.minute.count >= self.per_minute {
            return RateLimitDecision::MinuteExceeded {
                retry_after_secs: entry.minute.seconds_until_reset(now, MINUTE_WINDOW),
            };
        }

        if entry.hour.count >= self.per_hour {
            return RateLimitDecision::HourExceeded {
                retry_after_secs: entry.hour.seconds_until_reset(now, HOUR_WINDOW),
            };
        }

        entry.minute.count += 1;
        entry.hour.count += 1;

        RateLimitDecision::Admitted {
            remaining_minute: self.per_minute - entry.minute.count,
            remaining_hour: self.per_hour - entry.hour.count,
        }
    }

    /// Evict identities that have been idle for a full hour window.
    ///
    /// Counters are never explicitly destroyed on the request path, so a
    /// churn of distinct source addresses would otherwise grow the map
    /// without bound.
    pub async fn cleanup_expired(&self) {
        let now = self.clock.now();
        let mut clients = self.state.write().await;
        let before = clients.len();

        clients.retain(|_, counters| now.duration_since(counters.last_seen) < HOUR_WINDOW);

        let evicted = before - clients.len();
        if evicted > 0 {
            tracing::debug!(
                evicted,
                active = clients.len(),
                "Evicted idle rate limit entries"
            );
        }
    }

    /// Number of identities currently tracked
    pub async fn tracked_identities(&self) -> usize {
        self.state.read().await.len()
    }
}

/// Rate limiting errors
#[derive(Debug)]
pub enum RateLimitError {
    /// One of the windows is exhausted
    LimitExceeded {
        limit: u32,
        window: &'static str,
        retry_after_secs: u64,
    },
    /// Rate limiter not found in request extensions
    ConfigurationError,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        match self {
            RateLimitError::LimitExceeded {
                limit,
                window,
                retry_after_secs,
            } => {
                let body = Json(json!({
                    "detail": format!(
                        "Rate limit exceeded. Maximum {} requests per {}.",
                        limit, window
                    )
                }));

                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response.headers_mut().insert(
                    "Retry-After",
                    HeaderValue::from_str(&retry_after_secs.to_string())
                        .unwrap_or_else(|_| HeaderValue::from_static("60")),
                );
                response
            }
            RateLimitError::ConfigurationError => {
                let body = Json(json!({
                    "detail": "Rate limiter is not configured."
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Rate limiting middleware
///
/// Enforces per-IP fixed-window limits. Exempt paths and a disabled limiter
/// pass straight through without touching any counter. Admitted responses
/// carry the informational X-RateLimit-* headers; rejections carry
/// Retry-After.
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if is_exempt_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    // Extract the rate limiter from request extensions (injected by the router)
    let limiter = request
        .extensions()
        .get::<RateLimiter>()
        .cloned()
        .ok_or(RateLimitError::ConfigurationError)?;

    if !limiter.is_enabled() {
        return Ok(next.run(request).await);
    }

    let client_ip = extract_client_ip(&request);

    match limiter.check_and_increment(client_ip).await {
        RateLimitDecision::Admitted {
            remaining_minute,
            remaining_hour,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            insert_count_header(headers, "X-RateLimit-Limit-Minute", limiter.per_minute());
            insert_count_header(headers, "X-RateLimit-Remaining-Minute", remaining_minute);
            insert_count_header(headers, "X-RateLimit-Limit-Hour", limiter.per_hour());
            insert_count_header(headers, "X-RateLimit-Remaining-Hour", remaining_hour);
            Ok(response)
        }
        RateLimitDecision::MinuteExceeded { retry_after_secs } => {
            tracing::warn!(client = %client_ip, "Rate limit exceeded (per minute)");
            Err(RateLimitError::LimitExceeded {
                limit: limiter.per_minute(),
                window: "minute",
                retry_after_secs,
            })
        }
        RateLimitDecision::HourExceeded { retry_after_secs } => {
            tracing::warn!(client = %client_ip, "Rate limit exceeded (per hour)");
            Err(RateLimitError::LimitExceeded {
                limit: limiter.per_hour(),
                window: "hour",
                retry_after_secs,
            })
        }
    }
}

fn insert_count_header(headers: &mut axum::http::HeaderMap, name: &'static str, value: u32) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}

/// Extract the client IP address from a request
///
/// Precedence: first entry of X-Forwarded-For, then X-Real-IP, then the
/// connection's remote address. Falls back to localhost when none is
/// available (e.g. in-process test requests).
fn extract_client_ip(request: &Request) -> IpAddr {
    if let Some(forwarded) = request.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first) = forwarded_str.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.trim().parse::<IpAddr>() {
                return ip;
            }
        }
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    IpAddr::from([127, 0, 0, 1])
}
