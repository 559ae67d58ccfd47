use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use formgate::DEFAULT_ENV;
use formgate::config::loader::AppConfig;
use formgate::guard::{FormKind, GuardRegistry};
use formgate::observability::metrics::register_metrics;

// Demo: run a submission burst against the feedback form, watch the
// cooldown count down, then submit again.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    register_metrics();

    let env = std::env::var("FORMGATE_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let config = AppConfig::load(&env)?;
    let registry = GuardRegistry::from_config(&config.guards);

    let guard = registry.guard(FormKind::Feedback);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        if guard.check() {
            tracing::info!(
                "Attempt {} allowed, {} remaining in window",
                attempt,
                guard.attempts_remaining()
            );
        } else {
            tracing::warn!(
                "Attempt {} rejected, try again in {}s",
                attempt,
                guard.cooldown()
            );
            break;
        }
    }

    while guard.cooldown() > 0 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tracing::info!("Cooldown: {}s remaining", guard.cooldown());
    }

    tracing::info!("Cooldown over, submission allowed: {}", guard.check());
    Ok(())
}
