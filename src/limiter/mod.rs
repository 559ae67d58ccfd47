use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use crate::clock::{Clock, MonotonicClock};
use crate::config::LimiterConfig;

pub mod cooldown;

/// Limiter state: `Open` accepts attempts normally, `Limited` rejects
/// everything until the cooldown counts down to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimiterState {
    Open,
    Limited,
}

/// Sliding-window submission limiter with a punitive cooldown.
///
/// Tracks the timestamps of permitted attempts inside a rolling window.
/// Once the window holds `max_attempts` entries, the limiter enters
/// cooldown and rejects every attempt until `cooldown_seconds` one-second
/// ticks have elapsed, at which point the window is fully cleared
/// (reset-on-expiry, not reset-on-entry).
///
/// Rejection is a normal boolean outcome, never an error. The caller must
/// not perform the guarded action when `check_limit` returns false.
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    cooldown_seconds: u64,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

struct Inner {
    attempts: VecDeque<Instant>,
    cooldown_remaining: u64,
}

impl RateLimiter {
    pub fn new(config: &LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    pub fn with_clock(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        RateLimiter {
            max_attempts: config.max_attempts,
            window: config.window(),
            cooldown_seconds: config.cooldown_seconds,
            clock,
            inner: Mutex::new(Inner {
                attempts: VecDeque::new(),
                cooldown_remaining: 0,
            }),
        }
    }

    /// The authoritative decision for one candidate attempt.
    ///
    /// Records the attempt and returns true when it may proceed. Returns
    /// false while in cooldown (without recording), or when the attempt
    /// fills the window past `max_attempts` (which starts the cooldown).
    pub fn check_limit(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();

        // In cooldown: reject without touching the window
        if inner.cooldown_remaining > 0 {
            return false;
        }

        // Evict attempts that fell out of the window. The boundary is
        // exclusive: an attempt at exactly `now - window` is expired.
        while let Some(&front) = inner.attempts.front() {
            if now.duration_since(front) >= self.window {
                inner.attempts.pop_front();
            } else {
                break;
            }
        }

        if inner.attempts.len() >= self.max_attempts {
            inner.cooldown_remaining = self.cooldown_seconds;
            tracing::warn!(
                "Attempt limit hit ({} in window), cooling down for {}s",
                inner.attempts.len(),
                self.cooldown_seconds
            );
            return false;
        }

        inner.attempts.push_back(now);
        true
    }

    /// One cooldown second elapsed. Returns the remaining seconds.
    ///
    /// Reaching zero clears the whole window and reopens the limiter.
    /// No-op while open.
    pub fn tick(&self) -> u64 {
        let mut inner = self.inner.lock().unwrap();

        if inner.cooldown_remaining == 0 {
            return 0;
        }

        inner.cooldown_remaining -= 1;
        if inner.cooldown_remaining == 0 {
            // Reset-on-expiry: the user gets a full fresh window
            inner.attempts.clear();
            tracing::info!("Cooldown expired, window cleared");
        }
        inner.cooldown_remaining
    }

    /// Clears the window and ends any cooldown immediately. Idempotent.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.attempts.clear();
        inner.cooldown_remaining = 0;
    }

    pub fn state(&self) -> LimiterState {
        if self.inner.lock().unwrap().cooldown_remaining > 0 {
            LimiterState::Limited
        } else {
            LimiterState::Open
        }
    }

    /// Seconds left in the cooldown, 0 when open.
    pub fn cooldown(&self) -> u64 {
        self.inner.lock().unwrap().cooldown_remaining
    }

    /// True iff not in cooldown and the window still has room.
    pub fn can_proceed(&self) -> bool {
        let now = self.clock.now();
        let inner = self.inner.lock().unwrap();
        inner.cooldown_remaining == 0 && self.valid_attempts(&inner, now) < self.max_attempts
    }

    /// Attempts still allowed in the current window. Never negative.
    pub fn attempts_remaining(&self) -> usize {
        let now = self.clock.now();
        let inner = self.inner.lock().unwrap();
        self.max_attempts
            .saturating_sub(self.valid_attempts(&inner, now))
    }

    // Observation-side count, without mutating the stored window
    fn valid_attempts(&self, inner: &Inner, now: Instant) -> usize {
        inner
            .attempts
            .iter()
            .filter(|&&t| now.duration_since(t) < self.window)
            .count()
    }
}
