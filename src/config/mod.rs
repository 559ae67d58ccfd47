use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub max_attempts: usize,
    pub window_ms: u64,
    pub cooldown_seconds: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        LimiterConfig {
            max_attempts: 5,
            window_ms: 60_000,  // 1 minute
            cooldown_seconds: 30,
        }
    }
}

impl LimiterConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidLimiterConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(Error::InvalidLimiterConfig(
                "window_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-form limiter settings. Each form gets its own isolated limiter
/// instance built from its own section.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardsConfig {
    pub feedback: LimiterConfig,
    pub newsletter: LimiterConfig,
    pub appointment: LimiterConfig,
    pub contact: LimiterConfig,
}

impl GuardsConfig {
    pub fn validate(&self) -> Result<()> {
        self.feedback.validate()?;
        self.newsletter.validate()?;
        self.appointment.validate()?;
        self.contact.validate()?;
        Ok(())
    }
}
