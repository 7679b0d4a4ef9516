//! HTTP surface: the search endpoint and per-client rate limiting.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    extract::{ConnectInfo, Query, Request, State, rejection::QueryRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use sift_config::RateLimitSettings;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    error::QueryError,
    service::{SearchParams, SearchResult, SearchService},
};

/// Body of a rate-limited response.
const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

/// Most clients tracked individually. Clients beyond this share one window until
/// expired entries are purged.
const MAX_TRACKED_CLIENTS: usize = 65_536;

/// Key of the shared window for untracked clients.
const OVERFLOW_KEY: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Builds the application router.
pub fn router(service: Arc<SearchService>, rate_limit: &RateLimitSettings) -> Router {
    let mut app = Router::new()
        .route("/", get(search))
        .with_state(service);

    if let Some(limiter) = RateLimiter::new(rate_limit) {
        app = app.layer(middleware::from_fn_with_state(
            Arc::new(limiter),
            limit_requests,
        ));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// `GET /?id=..&q=..[&limit=..][&full=..]`
///
/// Query strings that do not deserialize, such as a repeated `q`, are invalid requests
/// like any other parameter problem.
async fn search(
    State(service): State<Arc<SearchService>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SearchResult>>, QueryError> {
    let Query(params) = params.map_err(|e| QueryError::InvalidRequest(e.body_text()))?;
    let results = service.query(params)?;
    Ok(Json(results))
}

/// Request count for one client in the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    /// When the window opened.
    started: Instant,
    /// Requests seen in it.
    count: u32,
}

/// Per-client windows and the time they were last swept.
#[derive(Debug)]
struct Clients {
    /// Current window per client.
    windows: HashMap<IpAddr, Window>,
    /// When expired windows were last removed.
    last_purge: Instant,
}

/// Fixed-window request limiter keyed by client IP.
///
/// Expired windows are swept once per window length, and at most `capacity` clients
/// are tracked, so memory stays bounded under a flood of distinct addresses.
#[derive(Debug)]
pub struct RateLimiter {
    /// Window length.
    window: Duration,
    /// Requests allowed per window.
    max_requests: u32,
    /// Clients tracked individually.
    capacity: usize,
    /// Client windows.
    clients: Mutex<Clients>,
}

impl RateLimiter {
    /// Creates a limiter, or `None` when `max_requests` is zero.
    pub fn new(settings: &RateLimitSettings) -> Option<Self> {
        (settings.max_requests > 0).then(|| Self {
            window: Duration::from_secs(settings.window_secs.max(1)),
            max_requests: settings.max_requests,
            capacity: MAX_TRACKED_CLIENTS,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                last_purge: Instant::now(),
            }),
        })
    }

    /// Records a request from `ip` and returns whether it is allowed.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    /// Records a request from `ip` at `now`.
    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock();
        if now.duration_since(clients.last_purge) >= self.window {
            clients
                .windows
                .retain(|_, w| now.duration_since(w.started) < self.window);
            clients.last_purge = now;
        }

        let key = if clients.windows.len() >= self.capacity && !clients.windows.contains_key(&ip)
        {
            OVERFLOW_KEY
        } else {
            ip
        };
        let window = clients.windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }
        window.count = window.count.saturating_add(1);
        window.count <= self.max_requests
    }
}

/// Rejects clients that exceeded their request budget with 429.
///
/// Requests without connection info share one budget.
async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = connect_info.map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| {
        addr.ip()
    });
    if !limiter.check(ip) {
        debug!(client = %ip, "rate limited");
        return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitSettings {
            window_secs: 60,
            max_requests,
        })
        .unwrap()
    }

    #[test]
    fn zero_max_requests_disables_limiting() {
        let settings = RateLimitSettings {
            window_secs: 60,
            max_requests: 0,
        };
        assert!(RateLimiter::new(&settings).is_none());
    }

    #[test]
    fn allows_up_to_max_per_window() {
        let limiter = limiter(2);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let now = Instant::now();
        assert!(limiter.check_at(ip, now));
        assert!(limiter.check_at(ip, now));
        assert!(!limiter.check_at(ip, now));
    }

    #[test]
    fn clients_are_tracked_separately() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
        assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), now));
        assert!(!limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
    }

    #[test]
    fn window_resets() {
        let limiter = limiter(1);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let now = Instant::now();
        assert!(limiter.check_at(ip, now));
        assert!(!limiter.check_at(ip, now + Duration::from_secs(30)));
        assert!(limiter.check_at(ip, now + Duration::from_secs(60)));
    }

    #[test]
    fn clients_beyond_capacity_share_a_window() {
        let mut limiter = limiter(1);
        limiter.capacity = 2;
        let now = Instant::now();
        for last in 1..=2 {
            assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)), now));
        }

        assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)), now));
        assert!(!limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4)), now));
        assert_eq!(limiter.clients.lock().windows.len(), 3);
    }

    #[test]
    fn expired_windows_are_purged() {
        let limiter = limiter(1);
        let now = Instant::now();
        for last in 1..=100 {
            limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 1, last)), now);
        }
        assert_eq!(limiter.clients.lock().windows.len(), 100);

        let later = now + Duration::from_secs(120);
        assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::LOCALHOST), later));
        assert_eq!(limiter.clients.lock().windows.len(), 1);
    }
}
