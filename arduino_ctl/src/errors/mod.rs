mod config_error;
mod device_error;

pub use config_error::ConfigError;
pub use device_error::{DeviceError, DeviceErrorKind};
