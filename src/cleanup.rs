use std::{env, time::Duration};

use tokio::time;
use tracing::info;

use crate::game::now_millis;
use crate::store::SessionStore;

fn env_secs(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Periodically evicts finished games that have outlived the retention
/// window. Runs for the lifetime of the process, independent of request
/// traffic.
pub async fn start_sweep_task(store: SessionStore) {
    let interval_secs = env_secs("SWEEP_INTERVAL_SECONDS", 60);
    let retention_secs = env_secs("GAME_RETENTION_SECONDS", 300);

    let max_age = Duration::from_secs(retention_secs);
    let mut interval = time::interval(Duration::from_secs(interval_secs));

    info!(
        "Started session sweep task: checking every {}s, retention window {}s",
        interval_secs, retention_secs
    );

    loop {
        interval.tick().await;
        store.sweep(now_millis(), max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_secs_falls_back_to_default() {
        assert_eq!(env_secs("SWEEP_TEST_UNSET_VARIABLE", 42), 42);
    }
}
