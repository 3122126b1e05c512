//! In-memory rate limiter.
//!
//! Fixed-window counters in a HashMap. State is per process and is lost
//! on restart; expired windows are pruned on demand.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimits;

#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    limits: RateLimits,
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: i64,
    window_secs: u64,
}

impl WindowState {
    fn ends_at(&self) -> i64 {
        self.window_start + self.window_secs as i64
    }
}

impl InMemoryRateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimits::default())
    }

    /// Counts one request for `key` at `now` (unix seconds).
    pub async fn check_at(&self, key: &RateLimitKey, now: i64) -> RateLimitResult {
        let limit = self.limits.for_scope(key.scope);
        let mut windows = self.windows.write().await;

        let state = windows
            .entry(key.storage_key())
            .or_insert_with(|| WindowState {
                count: 0,
                window_start: now,
                window_secs: limit.window_secs,
            });

        if now >= state.ends_at() {
            state.count = 0;
            state.window_start = now;
            state.window_secs = limit.window_secs;
        }

        if state.count >= limit.max_requests {
            let retry_after = (state.ends_at() - now).max(1) as u64;
            return RateLimitResult::Denied(RateLimitDenied {
                limit: limit.max_requests,
                retry_after_secs: retry_after,
                scope: key.scope,
            });
        }

        state.count += 1;
        RateLimitResult::Allowed(RateLimitStatus {
            limit: limit.max_requests,
            remaining: limit.max_requests.saturating_sub(state.count),
            reset_at: Timestamp::from_unix_secs(state.ends_at()).unwrap_or_else(Timestamp::now),
        })
    }

    /// Drops windows that ended before `now`.
    pub async fn prune_at(&self, now: i64) -> usize {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, state| state.ends_at() > now);
        before - windows.len()
    }

    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(&key, Timestamp::now().as_unix_secs()).await)
    }

    async fn prune(&self) -> usize {
        self.prune_at(Timestamp::now().as_unix_secs()).await
    }
}
