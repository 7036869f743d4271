mod control_surface;
pub use control_surface::*;

mod feedback;
pub use feedback::*;

mod poller;
pub use poller::*;

mod toggle_state;
pub use toggle_state::*;
