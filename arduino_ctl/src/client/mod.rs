mod device_api;
pub use device_api::*;

mod device_client;
pub use device_client::*;
