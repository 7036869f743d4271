//! Remote control for the Arduino rover.
//!
//! The rover firmware exposes a small HTTP API: movement, four sensor
//! channels that can be switched on and off, and a free-form stats feed.
//! This crate holds the wire types for that API (`protocol`), the endpoint
//! configuration (`config`), a stateless command client (`client`) and the
//! operator-side state machine that drives it (`surface`).

pub mod config;
pub mod errors;
pub mod protocol;
pub use errors::*;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub mod surface;

pub use config::{DeviceConfig, PanelConfig};
pub use protocol::{
    Channel, CommandResponse, DeviceRequest, Direction, MotorCode, MotorCommands, MoveCommand,
    MovementProtocol, StatsResponse, StatsSnapshot,
};
