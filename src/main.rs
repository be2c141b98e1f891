//! Headless canvas driver: hydrates from the persistence service and runs
//! the orbital simulation at a fixed tick rate, draining sync completions
//! between ticks. The rendering surface attaches to the same engine in the
//! full application; this binary exercises the engine without one.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use orbitpad::engine::{Engine, EngineConfig};
use orbitpad::persist::HttpPersistence;

const DEFAULT_PERSIST_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TICK_INTERVAL_MS: u64 = 33;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("PERSIST_BASE_URL").unwrap_or_else(|_| DEFAULT_PERSIST_BASE_URL.into());
    let tick_interval_ms = env_parse("TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS);
    let angle_seed = std::env::var("ORBIT_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok());

    let api = HttpPersistence::new(&base_url).expect("persistence client build failed");
    let mut engine = Engine::new(Arc::new(api), EngineConfig { angle_seed, ..EngineConfig::default() });

    info!(%base_url, tick_interval_ms, "orbitpad engine starting");
    engine.request_hydrate();

    let mut ticker = tokio::time::interval(Duration::from_millis(tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        engine.drain_completions();
        engine.tick();
    }
}
