use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

/// Sliding window limiter for trigger requests, keyed by app slug.
///
/// Keys come from the request URL, so entries whose window has fully
/// expired are evicted: the key checked is dropped as soon as it has no
/// live timestamps, and all other keys are swept once per window.
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// accepted request times per app, oldest first
    requests: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request for `key` unless it already made `max` requests
    /// within the last `window_secs`. Returns `true` when the limit is exceeded.
    pub fn check_rate_limit(&mut self, key: &str, max: usize, window_secs: u64) -> bool {
        self.check_rate_limit_at(key, max, window_secs, Instant::now())
    }

    fn check_rate_limit_at(&mut self, key: &str, max: usize, window_secs: u64, now: Instant) -> bool {
        let window = Duration::from_secs(window_secs);
        self.sweep_expired(window, now);

        let exceeded = match self.requests.get_mut(key) {
            Some(times) => {
                evict_before(times, window, now);
                times.len() >= max
            }
            None => max == 0,
        };

        if exceeded {
            return true;
        }
        self.requests
            .entry(key.to_string())
            .or_default()
            .push_back(now);
        false
    }

    /// Drops every key with no request inside the window, at most once per window.
    fn sweep_expired(&mut self, window: Duration, now: Instant) {
        let due = self
            .last_sweep
            .is_none_or(|last| now.duration_since(last) >= window);
        if !due {
            return;
        }
        self.requests.retain(|_, times| {
            evict_before(times, window, now);
            !times.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

fn evict_before(times: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    while times
        .front()
        .is_some_and(|&t| now.duration_since(t) >= window)
    {
        times.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_key() {
        let mut limiter = RateLimiter::new();
        let now = Instant::now();
        assert!(!limiter.check_rate_limit_at("app-a", 2, 60, now));
        assert!(!limiter.check_rate_limit_at("app-a", 2, 60, now));
        assert!(limiter.check_rate_limit_at("app-a", 2, 60, now));
        assert!(!limiter.check_rate_limit_at("app-b", 2, 60, now));
    }

    #[test]
    fn window_expires() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(!limiter.check_rate_limit_at("app", 1, 10, start));
        assert!(limiter.check_rate_limit_at("app", 1, 10, start + Duration::from_secs(5)));
        assert!(!limiter.check_rate_limit_at("app", 1, 10, start + Duration::from_secs(11)));
    }

    #[test]
    fn zero_max_always_limits() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check_rate_limit_at("app", 0, 10, Instant::now()));
        assert!(limiter.requests.is_empty());
    }

    #[test]
    fn expired_slugs_are_evicted() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        for i in 0..10_000 {
            assert!(!limiter.check_rate_limit_at(&format!("slug-{}", i), 5, 1, start));
        }
        assert_eq!(limiter.requests.len(), 10_000);

        let later = start + Duration::from_secs(3600);
        assert!(!limiter.check_rate_limit_at("slug-new", 5, 1, later));
        assert_eq!(limiter.requests.len(), 1);
        assert!(limiter.requests.contains_key("slug-new"));
    }

    #[test]
    fn live_keys_survive_sweep() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(!limiter.check_rate_limit_at("old", 5, 10, start));
        assert!(!limiter.check_rate_limit_at("recent", 5, 10, start + Duration::from_secs(8)));

        // "old" is outside the window at +12s, "recent" is not
        assert!(!limiter.check_rate_limit_at("other", 5, 10, start + Duration::from_secs(12)));
        assert!(!limiter.requests.contains_key("old"));
        assert_eq!(limiter.requests["recent"].len(), 1);
    }
}
