//! Gateway middleware: per-client rate limiting and request logging
//!
//! Submissions and polls draw from separate per-client budgets.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::ProxyError;

/// Which budget a request draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Submit,
    Poll,
    Other,
}

impl RouteClass {
    pub fn of(path: &str) -> Self {
        match path {
            "/api/analyze-address" => Self::Submit,
            "/api/get-results" => Self::Poll,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub submits_per_window: u32,
    pub polls_per_window: u32,
    pub other_per_window: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            submits_per_window: 20,
            // 12 polls per analysis, a few tabs per client
            polls_per_window: 120,
            other_per_window: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    fn budget(&self, class: RouteClass) -> u32 {
        match class {
            RouteClass::Submit => self.submits_per_window,
            RouteClass::Poll => self.polls_per_window,
            RouteClass::Other => self.other_per_window,
        }
    }
}

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    used: u32,
    opened: Instant,
}

/// Fixed-window counters keyed by (client, route class)
pub struct RateLimiter {
    windows: DashMap<(String, RouteClass), Window>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn check(&self, client: &str, class: RouteClass) -> RateDecision {
        self.check_at(client, class, Instant::now())
    }

    fn check_at(&self, client: &str, class: RouteClass, now: Instant) -> RateDecision {
        let budget = self.config.budget(class);
        let mut window = self
            .windows
            .entry((client.to_string(), class))
            .or_insert(Window { used: 0, opened: now });

        if now.duration_since(window.opened) >= self.config.window {
            *window = Window { used: 0, opened: now };
        }

        let reset_after = self
            .config
            .window
            .saturating_sub(now.duration_since(window.opened));

        if window.used >= budget {
            return RateDecision { allowed: false, remaining: 0, reset_after };
        }

        window.used += 1;
        RateDecision {
            allowed: true,
            remaining: budget - window.used,
            reset_after,
        }
    }

    /// Forget clients idle for two windows; returns how many entries went away
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        let horizon = self.config.window * 2;
        self.windows
            .retain(|_, window| now.duration_since(window.opened) < horizon);
        // entries inserted concurrently can leave len() above `before`
        before.saturating_sub(self.windows.len())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> = Arc::new(RateLimiter::default());
}

/// Spawn the periodic rate limiter cleanup
pub fn start_cleanup_task() {
    tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            let removed = RATE_LIMITER.cleanup();
            if removed > 0 {
                info!("🧹 Rate limiter cleanup: {} idle windows dropped", removed);
            }
        }
    });
}

/// Client identity: first hop of `X-Forwarded-For`, then `X-Real-IP`
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn too_many_requests(decision: RateDecision) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ProxyError::new("Too many requests, slow down")),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, decision.reset_after.as_secs().max(1).into());
    response
}

pub async fn rate_limit_middleware(headers: HeaderMap, request: Request, next: Next) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = client_key(&headers);
    let class = RouteClass::of(request.uri().path());
    let decision = RATE_LIMITER.check(&client, class);

    if !decision.allowed {
        warn!(client = %client, class = ?class, "🚦 Rate limit exceeded");
        return too_many_requests(decision);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", decision.remaining.into());
    headers.insert("X-RateLimit-Reset", decision.reset_after.as_secs().into());
    response
}

/// Logs every request and tags the response with an `X-Request-Id`
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        warn!(request_id = %request_id, %method, %path, status = status.as_u16(),
              latency_ms = start.elapsed().as_millis() as u64, "Request failed");
    } else if path == "/api/get-results" {
        // polls are chatty
        debug!(request_id = %request_id, %method, %path, status = status.as_u16(),
               latency_ms = start.elapsed().as_millis() as u64, "Request completed");
    } else {
        info!(request_id = %request_id, %method, %path, status = status.as_u16(),
              latency_ms = start.elapsed().as_millis() as u64, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("X-Request-Id", value);
    }
    response
}
