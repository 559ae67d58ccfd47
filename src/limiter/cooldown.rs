use std::sync::Arc;
use tokio::time::{Duration, interval};
use crate::limiter::RateLimiter;

/// Tick interval of the cooldown countdown.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the one-second countdown of a limiter in cooldown.
///
/// Runs until the countdown reaches zero (which clears the window and
/// reopens the limiter). The owning guard holds the task handle and
/// aborts it on reset or teardown.
pub struct CooldownTicker {
    limiter: Arc<RateLimiter>,
}

impl CooldownTicker {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        CooldownTicker { limiter }
    }

    pub async fn run(self) {
        let mut ticker = interval(TICK_INTERVAL);

        // interval's first tick completes immediately; consume it so the
        // countdown starts one full second after cooldown entry
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let remaining = self.limiter.tick();
            tracing::debug!("Cooldown tick: {}s remaining", remaining);

            if remaining == 0 {
                break;
            }
        }
    }
}
