//! In-memory rate limiter implementation.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! State lives in process memory only; restarting the process clears it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::WindowLimits;

/// Tracked keys above which expired windows are purged on the next write.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// In-memory rate limiter for one action.
///
/// Each window tracks the count of requests and restarts lazily on the
/// first request after it expires. The window clock is tokio's, so tests
/// can pause and advance it.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    /// Limits applied to every key.
    limits: WindowLimits,
    /// Per-key window state.
    windows: Arc<RwLock<HashMap<RateLimitKey, WindowState>>>,
    sweep_threshold: usize,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// When the current window started.
    window_start: Instant,
}

impl WindowState {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now >= self.window_start + window
    }
}

impl InMemoryRateLimiter {
    pub fn new(limits: WindowLimits) -> Self {
        Self {
            limits,
            windows: Arc::new(RwLock::new(HashMap::new())),
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    /// Sets how many tracked keys trigger a purge of expired windows.
    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    pub fn limits(&self) -> WindowLimits {
        self.limits
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.limits.window_secs))
    }

    /// Whole seconds until the window ends, rounded up.
    fn secs_until_reset(&self, window_start: Instant, now: Instant) -> u32 {
        let remaining = (window_start + self.window()).saturating_duration_since(now);
        let mut secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            secs += 1;
        }
        secs as u32
    }

    fn reset_at(&self, secs_until_reset: u32) -> Timestamp {
        Timestamp::now().plus_secs(u64::from(secs_until_reset))
    }

    fn sweep(&self, windows: &mut HashMap<RateLimitKey, WindowState>, now: Instant) {
        let window = self.window();
        let before = windows.len();
        windows.retain(|_, state| !state.is_expired(now, window));
        debug!(
            before,
            after = windows.len(),
            "swept expired rate limit windows"
        );
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let limit = self.limits.limit_for(key.class());
        let window = self.window();
        let now = Instant::now();

        let mut windows = self.windows.write().await;

        if windows.len() >= self.sweep_threshold && !windows.contains_key(&key) {
            self.sweep(&mut windows, now);
        }

        let scope = key.scope;
        let state = windows.entry(key).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
        });

        if state.is_expired(now, window) {
            state.count = 0;
            state.window_start = now;
        }

        let secs_until_reset = self.secs_until_reset(state.window_start, now);

        if state.count >= limit {
            let retry_after = secs_until_reset.max(1);
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs: retry_after,
                reset_at: self.reset_at(retry_after),
                scope,
                message: format!(
                    "Rate limit exceeded. Please try again in {} seconds.",
                    retry_after
                ),
            }));
        }

        state.count += 1;

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit - state.count,
            reset_at: self.reset_at(secs_until_reset),
            window_secs: self.limits.window_secs,
        }))
    }
}
