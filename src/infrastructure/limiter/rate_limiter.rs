use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::sleep;

/// Outcome of a single limiter check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub retry_after_secs: Option<u64>,
    pub limit: u64,
}

/// Sliding window approximated from the current and previous fixed window.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
        let weight = (elapsed / self.window_size.as_secs_f64()).min(1.0);
        (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64)
    }

    fn check(&mut self, now: Instant) -> RateDecision {
        self.last_seen = now;
        self.roll(now);

        let effective = self.effective(now);
        if effective + 1.0 <= self.limit as f64 + 1e-9 {
            self.current_count += 1;
            let used = (effective + 1.0).ceil() as u64;
            return RateDecision {
                allowed: true,
                remaining: self.limit.saturating_sub(used),
                retry_after_secs: None,
                limit: self.limit,
            };
        }

        let until_next_window = self
            .window_size
            .saturating_sub(now.duration_since(self.current_window_start));
        RateDecision {
            allowed: false,
            remaining: 0,
            retry_after_secs: Some(until_next_window.as_secs().max(1)),
            limit: self.limit,
        }
    }
}

type Key = String;

/// Per-key limiter store, e.g. contact submissions per client address.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
    idle_ttl: Duration,
}

impl RateLimiterStore {
    pub fn new(limit: u64, window_size: Duration, idle_ttl: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
            idle_ttl,
        }
    }

    /// `limit` requests per hour, idle keys dropped after two hours.
    pub fn per_hour(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(3600), Duration::from_secs(7200))
    }

    /// Starts the background task dropping keys idle longer than the ttl.
    /// Must be called from inside a tokio runtime.
    pub fn spawn_eviction(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(60)).await;
                store.evict_idle(Instant::now());
            }
        });
    }

    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.map.len();
        self.map
            .retain(|_, window| now.duration_since(window.lock().last_seen) <= self.idle_ttl);
        before - self.map.len()
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.get_window(key, now);
        let mut guard = window.lock();
        guard.check(now)
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}
