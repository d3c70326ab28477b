use std::collections::HashMap;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::http::header;
use parking_lot::Mutex;

use common::RateLimitConfig;

pub fn cors_middleware() -> Cors {
    Cors::default()
        .allow_any_origin() // More permissive for development
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600) // 1 hour
}

/// Fixed-window request limiter keyed by client address. Requests over the
/// window's budget are rejected immediately, never queued.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client`; false means over budget.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock();
        let window = self.window;

        let entry = hits.entry(client.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < window);

        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    pub fn message(&self) -> String {
        format!(
            "Rate limit exceeded: {} requests per {} seconds. Please try again later.",
            self.max_requests,
            self.window.as_secs()
        )
    }
}
