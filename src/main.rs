use std::sync::Arc;

use lumen::config::Config;
use lumen::dispatch::Dispatcher;
use lumen::handlers::LedBank;
use lumen::{server, site};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let leds = Arc::new(LedBank::new(cfg.led_count));
    let registry = site::resource_table(leds)?;
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));

    tokio::select! {
        res = server::listener::run(&cfg, dispatcher) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
