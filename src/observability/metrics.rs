use lazy_static::lazy_static;
use prometheus::{Counter, IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Submission metrics
    pub static ref SUBMISSIONS_ALLOWED: Counter = Counter::new(
        "submissions_allowed_total",
        "Total number of submissions allowed"
    ).unwrap();

    pub static ref SUBMISSIONS_REJECTED: Counter = Counter::new(
        "submissions_rejected_total",
        "Total number of submissions rejected"
    ).unwrap();

    // Cooldown metrics
    pub static ref COOLDOWNS_TRIGGERED: Counter = Counter::new(
        "cooldowns_triggered_total",
        "Total number of cooldowns triggered"
    ).unwrap();

    pub static ref ACTIVE_COOLDOWNS: IntGauge = IntGauge::new(
        "active_cooldowns",
        "Number of guards currently in cooldown"
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(SUBMISSIONS_ALLOWED.clone())).unwrap();
    REGISTRY.register(Box::new(SUBMISSIONS_REJECTED.clone())).unwrap();
    REGISTRY.register(Box::new(COOLDOWNS_TRIGGERED.clone())).unwrap();
    REGISTRY.register(Box::new(ACTIVE_COOLDOWNS.clone())).unwrap();
}
