use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use crate::clock::Clock;
use crate::config::{GuardsConfig, LimiterConfig};
use crate::limiter::cooldown::CooldownTicker;
use crate::limiter::{LimiterState, RateLimiter};
use crate::observability::metrics::{
    ACTIVE_COOLDOWNS, COOLDOWNS_TRIGGERED, SUBMISSIONS_ALLOWED, SUBMISSIONS_REJECTED,
};
use crate::observability::tracing::trace_submission_check;

/// The storefront forms that carry a submission guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Feedback,
    Newsletter,
    Appointment,
    Contact,
}

impl FormKind {
    pub const ALL: [FormKind; 4] = [
        FormKind::Feedback,
        FormKind::Newsletter,
        FormKind::Appointment,
        FormKind::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Feedback => "feedback",
            FormKind::Newsletter => "newsletter",
            FormKind::Appointment => "appointment",
            FormKind::Contact => "contact",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One guarded form: the limiter plus the cooldown ticker task it owns.
///
/// The form handler calls `check` immediately before the remote write; on
/// false it surfaces `cooldown()` to the user ("try again in N seconds")
/// and skips the write. The ticker task is aborted on reset and on drop
/// so it never outlives its guard.
pub struct SubmissionGuard {
    form: FormKind,
    limiter: Arc<RateLimiter>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SubmissionGuard {
    pub fn new(form: FormKind, config: &LimiterConfig) -> Self {
        SubmissionGuard {
            form,
            limiter: Arc::new(RateLimiter::new(config)),
            ticker: Mutex::new(None),
        }
    }

    pub fn with_clock(form: FormKind, config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        SubmissionGuard {
            form,
            limiter: Arc::new(RateLimiter::with_clock(config, clock)),
            ticker: Mutex::new(None),
        }
    }

    /// Decide one submission attempt. Must run inside a tokio runtime:
    /// entering cooldown spawns the countdown task.
    pub fn check(&self) -> bool {
        let _span = trace_submission_check(self.form).entered();

        if self.limiter.check_limit() {
            SUBMISSIONS_ALLOWED.inc();
            return true;
        }
        SUBMISSIONS_REJECTED.inc();

        // A freshly entered cooldown needs its countdown task
        if self.limiter.cooldown() > 0 {
            let mut ticker = self.ticker.lock().unwrap();
            let running = ticker.as_ref().is_some_and(|handle| !handle.is_finished());
            if !running {
                COOLDOWNS_TRIGGERED.inc();
                ACTIVE_COOLDOWNS.inc();
                tracing::warn!(
                    "Form {} rate limited, cooldown {}s",
                    self.form,
                    self.limiter.cooldown()
                );

                let limiter = Arc::clone(&self.limiter);
                *ticker = Some(tokio::spawn(async move {
                    CooldownTicker::new(limiter).run().await;
                    ACTIVE_COOLDOWNS.dec();
                }));
            }
        }
        false
    }

    /// Clears the window, ends any cooldown, and cancels the ticker task.
    /// Idempotent.
    pub fn reset(&self) {
        self.cancel_ticker();
        self.limiter.reset();
        tracing::debug!("Form {} guard reset", self.form);
    }

    pub fn form(&self) -> FormKind {
        self.form
    }

    pub fn state(&self) -> LimiterState {
        self.limiter.state()
    }

    pub fn can_proceed(&self) -> bool {
        self.limiter.can_proceed()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.limiter.attempts_remaining()
    }

    /// Seconds the user still has to wait, 0 when open.
    pub fn cooldown(&self) -> u64 {
        self.limiter.cooldown()
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            if !handle.is_finished() {
                handle.abort();
                ACTIVE_COOLDOWNS.dec();
            }
        }
    }

    #[cfg(test)]
    fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

/// One isolated guard per form. No shared singleton: exhausting one
/// form's window never affects another's.
pub struct GuardRegistry {
    guards: HashMap<FormKind, SubmissionGuard>,
}

impl GuardRegistry {
    pub fn from_config(config: &GuardsConfig) -> Self {
        let mut guards = HashMap::new();
        guards.insert(
            FormKind::Feedback,
            SubmissionGuard::new(FormKind::Feedback, &config.feedback),
        );
        guards.insert(
            FormKind::Newsletter,
            SubmissionGuard::new(FormKind::Newsletter, &config.newsletter),
        );
        guards.insert(
            FormKind::Appointment,
            SubmissionGuard::new(FormKind::Appointment, &config.appointment),
        );
        guards.insert(
            FormKind::Contact,
            SubmissionGuard::new(FormKind::Contact, &config.contact),
        );
        GuardRegistry { guards }
    }

    pub fn guard(&self, form: FormKind) -> &SubmissionGuard {
        // Every FormKind is inserted by from_config
        &self.guards[&form]
    }

    pub fn reset_all(&self) {
        for guard in self.guards.values() {
            guard.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    fn tight_config() -> LimiterConfig {
        LimiterConfig {
            max_attempts: 2,
            window_ms: 600_000,
            cooldown_seconds: 3,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_cooldown_cycle() {
        let guard = SubmissionGuard::new(FormKind::Feedback, &tight_config());

        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());
        assert_eq!(guard.state(), LimiterState::Limited);
        assert_eq!(guard.cooldown(), 3);

        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(guard.cooldown(), 0);
        assert_eq!(guard.state(), LimiterState::Open);
        assert_eq!(guard.attempts_remaining(), 2);
        assert!(guard.check());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_cooldown_and_ticker() {
        let guard = SubmissionGuard::new(FormKind::Contact, &tight_config());

        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());
        assert_eq!(guard.cooldown(), 3);

        guard.reset();
        assert_eq!(guard.cooldown(), 0);
        assert!(guard.can_proceed());
        assert!(guard.check());

        // The aborted ticker must not fire later and disturb state
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(guard.cooldown(), 0);
        assert_eq!(guard.attempts_remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_idempotent() {
        let guard = SubmissionGuard::new(FormKind::Newsletter, &tight_config());

        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());

        guard.reset();
        guard.reset();
        assert_eq!(guard.cooldown(), 0);
        assert!(guard.check());
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_can_retrigger_after_expiry() {
        let guard = SubmissionGuard::new(FormKind::Appointment, &tight_config());

        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(guard.state(), LimiterState::Open);

        // Second burst spawns a fresh ticker
        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());
        assert_eq!(guard.cooldown(), 3);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(guard.check());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_ticker() {
        let guard = SubmissionGuard::new(FormKind::Feedback, &tight_config());

        assert!(guard.check());
        assert!(guard.check());
        assert!(!guard.check());

        let limiter = guard.limiter();
        drop(guard);

        // Without its ticker the countdown stands still
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(limiter.cooldown(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn forms_are_isolated() {
        let config = GuardsConfig {
            feedback: LimiterConfig {
                max_attempts: 1,
                window_ms: 600_000,
                cooldown_seconds: 30,
            },
            ..Default::default()
        };
        let registry = GuardRegistry::from_config(&config);

        let feedback = registry.guard(FormKind::Feedback);
        assert!(feedback.check());
        assert!(!feedback.check());
        assert_eq!(feedback.state(), LimiterState::Limited);

        for form in [FormKind::Newsletter, FormKind::Appointment, FormKind::Contact] {
            let guard = registry.guard(form);
            assert!(guard.can_proceed());
            assert!(guard.check());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reset_all_reopens_every_form() {
        let registry = GuardRegistry::from_config(&GuardsConfig::default());

        for form in FormKind::ALL {
            let guard = registry.guard(form);
            for _ in 0..5 {
                assert!(guard.check());
            }
            assert!(!guard.check());
        }

        registry.reset_all();

        for form in FormKind::ALL {
            let guard = registry.guard(form);
            assert_eq!(guard.cooldown(), 0);
            assert!(guard.check());
        }
    }
}
