//! Rate Limiting Service
//!
//! Fixed-window rate limiting over a shared atomic counter store. Used to
//! throttle login attempts per email so brute-force runs hit the limit
//! regardless of credential validity.

use std::sync::Arc;

use crate::store::CounterStore;
use crate::utils::error::StoreResult;

/// Policy for login attempt throttling
#[derive(Debug, Clone)]
pub struct LoginRatePolicy {
    pub max_attempts: u64,
    pub window_secs: u64,
}

impl Default for LoginRatePolicy {
    /// 5 attempts per rolling minute
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 60,
        }
    }
}

impl LoginRatePolicy {
    pub fn new(max_attempts: u64, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window_secs,
        }
    }
}

/// Fixed-window rate limiter keyed by identity strings
#[derive(Clone)]
pub struct RateLimiter {
    counters: Arc<dyn CounterStore>,
}

impl RateLimiter {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }

    /// Count an attempt for `key` and report whether it is still within
    /// the limit. Every call increments, including denied ones, so a
    /// client hammering past the limit keeps extending its attempt count
    /// within the window.
    pub async fn allow(&self, key: &str, limit: u64, window_secs: u64) -> StoreResult<bool> {
        let count = self.counters.increment(key, window_secs).await?;
        Ok(count <= limit)
    }
}

/// Rate-limit key for login attempts on an email address
pub fn login_attempts_key(email: &str) -> String {
    format!("login_attempts:{email}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCounterStore;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(InMemoryCounterStore::new()))
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = limiter();

        for _ in 0..5 {
            assert!(limiter.allow("k", 5, 60).await.unwrap());
        }
        assert!(!limiter.allow("k", 5, 60).await.unwrap());
        assert!(!limiter.allow("k", 5, 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter();

        for _ in 0..6 {
            limiter.allow("a", 5, 60).await.unwrap();
        }
        assert!(!limiter.allow("a", 5, 60).await.unwrap());
        assert!(limiter.allow("b", 5, 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_lapsed_window_allows_again() {
        let limiter = limiter();

        // Zero-length window lapses immediately between calls
        for _ in 0..10 {
            assert!(limiter.allow("k", 1, 0).await.unwrap());
        }
    }

    #[test]
    fn test_login_attempts_key_format() {
        assert_eq!(
            login_attempts_key("a@b.com"),
            "login_attempts:a@b.com"
        );
    }

    #[test]
    fn test_default_policy() {
        let policy = LoginRatePolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.window_secs, 60);
    }
}
