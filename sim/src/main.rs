// Simulated rover firmware
// Run with: cargo run -p sim
// Then point the panel at it: ARDUINO_BASE_URL=http://127.0.0.1:8080 cargo run -p control_panel

use std::error::Error;
use std::time::Duration;

use sim::{SimDevice, SimOptions, StatsMode};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("SIM_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let latency = std::env::var("SIM_LATENCY_MS")
        .ok()
        .and_then(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_default();
    let stats_mode = match std::env::var("SIM_STATS_MODE") {
        Ok(mode) => mode.parse::<StatsMode>()?,
        Err(_) => StatsMode::Live,
    };
    let garbled_replies = std::env::var("SIM_GARBLED_REPLIES")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Simulated rover listening on {} (latency {:?}, stats {:?})", addr, latency, stats_mode);

    sim::serve(listener, SimDevice::new(SimOptions {
        latency,
        stats_mode,
        garbled_replies,
    })).await?;
    Ok(())
}
