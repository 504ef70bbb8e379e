//! HTTP middleware chain
//! Rate limiting, request timing, and logging applied to every route.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;

/// Shared application state.
///
/// Services are wrapped in `Arc` so clones are pointer copies and one
/// instance serves all concurrent requests. The rate limiter lives here
/// explicitly instead of as middleware-attached state; its scope is a
/// single process.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::AppConfig,
    pub db: sqlx::PgPool,
    pub token_service: Arc<crate::auth::TokenService>,
    pub auth_service: Arc<crate::services::AuthService>,
    pub rate_limiter: Arc<SlidingWindowLimiter>,
}

/// Request tracking middleware
/// Opens a span per request, records timing and metrics, and stamps
/// `x-request-id` / `x-process-time` on the response.
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!("http_requests_total").increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        let mut response = response;
        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert("x-request-id", value);
        }
        if let Ok(value) = format!("{:.6}", elapsed.as_secs_f64()).parse() {
            response.headers_mut().insert("x-process-time", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Rate limiting middleware, keyed by client IP.
/// Applied globally, before authentication, so unauthenticated traffic
/// is gated too.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = client_ip(&req, state.config.rate_limit.trust_proxy);

    if !state.rate_limiter.admit(client_ip) {
        tracing::warn!(
            client_ip = %client_ip,
            uri = %req.uri().path(),
            "Rate limit exceeded"
        );
        metrics::counter!("http_requests_rate_limited_total").increment(1);
        return Err(AppError::RateLimited);
    }

    // Make the resolved IP available downstream
    req.extensions_mut().insert(client_ip);

    Ok(next.run(req).await)
}

/// Resolve the client IP for rate limiting.
/// Proxy headers are honored only when `trust_proxy` is set; otherwise
/// the connection peer address is used, falling back to loopback when
/// no connect info is present (e.g. in tests).
fn client_ip(req: &Request, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(ip) = ip_from_proxy_headers(req.headers()) {
            return ip;
        }
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn ip_from_proxy_headers(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For may carry a chain; the first entry is the client
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            if let Ok(ip) = s.parse() {
                return Some(ip);
            }
        }
    }

    None
}

// ==================== Sliding window rate limiter ====================

/// Per-IP sliding-window admission gate.
///
/// Each client keeps the timestamps of its requests within the trailing
/// window; stale entries are pruned lazily on that client's next check.
/// A client that goes idle leaves a small stale entry behind for the
/// process lifetime, which is an accepted characteristic of this
/// limiter. State is in-memory only and lost on restart.
pub struct SlidingWindowLimiter {
    windows: DashMap<IpAddr, Arc<ClientWindow>>,
    max_requests: usize,
    window: Duration,
}

struct ClientWindow {
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: max_requests as usize,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Check whether a request from `ip` is admitted now
    pub fn admit(&self, ip: IpAddr) -> bool {
        self.admit_at(ip, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    ///
    /// Prunes timestamps older than the window, rejects without
    /// recording when the remaining count has reached the limit, and
    /// records the request otherwise.
    pub fn admit_at(&self, ip: IpAddr, now: Instant) -> bool {
        let window = self
            .windows
            .entry(ip)
            .or_insert_with(|| {
                Arc::new(ClientWindow {
                    timestamps: Mutex::new(VecDeque::new()),
                })
            })
            .clone();

        let mut timestamps = window.timestamps.lock().unwrap();

        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) < self.window {
                break;
            }
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Number of client entries currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}
