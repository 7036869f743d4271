// Library exports for the simulated rover firmware

pub mod device_state;
pub mod routes;

pub use device_state::{DeviceState, SimDevice, SimOptions, StatsMode};
pub use routes::router;

use tokio::net::TcpListener;

/// Serves the firmware API on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, device: SimDevice) -> std::io::Result<()> {
    axum::serve(listener, router(device)).await
}
