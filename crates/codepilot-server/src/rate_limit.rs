// Rate Limiting
//
// Fixed-window request counter per client address, applied to the /ai routes.
// A request over the limit is answered with 429 before it reaches the AI
// service.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::ServerConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

/// Per-client fixed window limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.rate_limit_max, config.rate_limit_window)
    }

    /// Check if a request from `client` is allowed and count it
    ///
    /// On rejection the error carries the time left until the window resets.
    pub fn check_and_increment(&self, client: IpAddr) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.window;

        // Expired windows start over on the next request
        clients.retain(|_, w| now.saturating_duration_since(w.start) < window);

        let entry = clients.entry(client).or_insert(Window { start: now, count: 0 });
        if entry.count >= self.max_requests {
            return Err(window.saturating_sub(now.saturating_duration_since(entry.start)));
        }
        entry.count += 1;
        Ok(())
    }

    /// Requests counted for `client` in its current window
    pub fn current_count(&self, client: IpAddr) -> u32 {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&client)
            .map_or(0, |w| w.count)
    }
}

/// Peer address from the connection; requests served without connect info
/// share one bucket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware rejecting requests over the client's limit
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    if let Err(retry_after) = limiter.check_and_increment(client) {
        log::warn!("[server] rate limit exceeded for {} on {}", client, request.uri().path());
        return ApiError::RateLimited { retry_after }.into_response();
    }
    next.run(request).await
}
