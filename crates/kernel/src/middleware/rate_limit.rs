//! In-memory rate limiting keyed by client identifier.
//!
//! Uses a fixed-window counter per key. State is process-local: under
//! horizontal scaling this degrades to per-instance limiting, which is an
//! accepted limitation — multi-instance correctness requires an external
//! store and is out of scope.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use dashmap::DashMap;
use tracing::debug;

/// Entries whose window started longer ago than this are swept.
const RETENTION: Duration = Duration::from_secs(3600);

/// Default interval between background sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Time source for window accounting.
///
/// Injected so window expiry and sweeping are deterministic in tests.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic elapsed time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `std::time::Instant`.
pub struct SystemClock {
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A single (max requests, window) policy.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// Seconds a limited client should wait before retrying.
    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs()
    }
}

/// Rate limit configuration for the public endpoint categories.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Contact form submissions.
    pub contact: RateLimitPolicy,
    /// Sample request submissions.
    pub samples: RateLimitPolicy,
    /// Cache revalidation calls.
    pub revalidate: RateLimitPolicy,
    /// Translation proxy calls.
    pub translate: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            contact: RateLimitPolicy::new(5, Duration::from_secs(600)), // 5 per 10 minutes
            samples: RateLimitPolicy::new(5, Duration::from_secs(600)), // 5 per 10 minutes
            revalidate: RateLimitPolicy::new(10, Duration::from_secs(60)), // 10 per minute
            translate: RateLimitPolicy::new(20, Duration::from_secs(60)), // 20 per minute
        }
    }
}

/// Outcome of a rate limit check.
///
/// Exceeding the limit is not an error condition: callers consume the
/// boolean and emit a 429 themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Duration,
}

/// Keyed fixed-window rate limiter.
pub struct RateLimiter {
    entries: DashMap<String, WindowEntry>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a rate limiter on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create a rate limiter with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Check whether a call for `key` is permitted under `policy`.
    ///
    /// On first observation of a key, or once the window has elapsed since
    /// the key's last reset, the counter resets to 1. At the limit the call
    /// is rejected with no side effect on the counter.
    pub fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.now();

        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if entry.count == 0 || now.saturating_sub(entry.window_start) >= policy.window {
            entry.count = 1;
            entry.window_start = now;
            return RateLimitDecision {
                allowed: true,
                remaining: policy.limit.saturating_sub(1),
            };
        }

        if entry.count < policy.limit {
            entry.count += 1;
            return RateLimitDecision {
                allowed: true,
                remaining: policy.limit - entry.count,
            };
        }

        debug!(key = key, limit = policy.limit, "rate limit exceeded");
        RateLimitDecision {
            allowed: false,
            remaining: 0,
        }
    }

    /// Remove entries whose window started longer than the retention
    /// threshold ago. Returns the number of removed entries.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.window_start) < RETENTION);
        before - self.entries.len()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn the background sweep task.
    ///
    /// The returned handle stops the task when dropped, giving the sweeper
    /// an explicit lifecycle instead of a detached process-wide timer.
    pub fn start_sweeper(self: Arc<Self>, interval: Duration) -> SweeperHandle {
        let limiter = self;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so a fresh map
            // is not swept at startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed = removed, "swept expired rate limit entries");
                }
            }
        });

        SweeperHandle { task }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Handle owning the background sweep task.
pub struct SweeperHandle {
    task: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweep task.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Get the client identifier for rate limiting.
///
/// Precedence: first comma-separated entry of `x-forwarded-for`, then
/// `x-real-ip`, then the literal `"unknown"`.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }

    "unknown".to_string()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// Deterministic clock advanced manually by tests.
    struct ManualClock {
        millis: AtomicU64,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                millis: AtomicU64::new(0),
            }
        }

        fn advance(&self, duration: Duration) {
            self.millis
                .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }
    }

    fn limiter() -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    const POLICY: RateLimitPolicy = RateLimitPolicy::new(3, Duration::from_secs(60));

    #[test]
    fn first_call_resets_counter() {
        let (_, limiter) = limiter();
        let decision = limiter.check("1.2.3.4", POLICY);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn exceeding_limit_fails_without_side_effect() {
        let (clock, limiter) = limiter();

        for _ in 0..3 {
            assert!(limiter.check("1.2.3.4", POLICY).allowed);
        }

        // Fourth call within the window fails.
        let rejected = limiter.check("1.2.3.4", POLICY);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);

        // Rejected calls do not extend the window: once the original window
        // elapses, the next call succeeds again.
        clock.advance(Duration::from_secs(60));
        let decision = limiter.check("1.2.3.4", POLICY);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn window_elapse_resets_remaining() {
        let (clock, limiter) = limiter();

        assert!(limiter.check("1.2.3.4", POLICY).allowed);
        assert!(limiter.check("1.2.3.4", POLICY).allowed);

        clock.advance(Duration::from_secs(61));

        let decision = limiter.check("1.2.3.4", POLICY);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, POLICY.limit - 1);
    }

    #[test]
    fn keys_are_independent() {
        let (_, limiter) = limiter();

        for _ in 0..4 {
            limiter.check("1.2.3.4", POLICY);
        }
        assert!(!limiter.check("1.2.3.4", POLICY).allowed);

        // Exhausting one key never affects another.
        let other = limiter.check("5.6.7.8", POLICY);
        assert!(other.allowed);
        assert_eq!(other.remaining, 2);
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let (clock, limiter) = limiter();

        limiter.check("old", POLICY);
        clock.advance(RETENTION);
        limiter.check("fresh", POLICY);

        let removed = limiter.sweep();
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);

        // The surviving entry still enforces its window.
        limiter.check("fresh", POLICY);
        limiter.check("fresh", POLICY);
        assert!(!limiter.check("fresh", POLICY).allowed);
    }

    #[test]
    fn sweep_on_empty_map() {
        let (_, limiter) = limiter();
        assert_eq!(limiter.sweep(), 0);
        assert!(limiter.is_empty());
    }

    #[test]
    fn client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_key(&headers), "198.51.100.2");
    }

    #[test]
    fn client_key_unknown_without_headers() {
        let headers = HeaderMap::new();
        assert_eq!(client_key(&headers), "unknown");
    }

    #[test]
    fn default_config_matches_endpoint_policies() {
        let config = RateLimitConfig::default();
        assert_eq!(config.contact.limit, 5);
        assert_eq!(config.contact.retry_after_secs(), 600);
        assert_eq!(config.revalidate.limit, 10);
        assert_eq!(config.revalidate.retry_after_secs(), 60);
        assert_eq!(config.translate.limit, 20);
    }
}
