mod device_config;
pub use device_config::*;

mod panel_config;
pub use panel_config::*;
