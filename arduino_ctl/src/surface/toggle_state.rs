use serde::{Deserialize, Serialize};

use crate::Channel;

/// On/off flag per sensor channel, as the operator currently sees it.
///
/// The firmware never reports these back, so this is the only copy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleStates {
    flags: [bool; 4],
}

impl ToggleStates {
    pub fn get(&self, channel: Channel) -> bool {
        self.flags[channel.index()]
    }

    /// Sets the flag and returns the previous value.
    pub fn set(&mut self, channel: Channel, enabled: bool) -> bool {
        std::mem::replace(&mut self.flags[channel.index()], enabled)
    }

    /// Inverts the flag and returns the new value.
    pub fn flip(&mut self, channel: Channel) -> bool {
        let enabled = !self.get(channel);
        self.set(channel, enabled);
        enabled
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, bool)> + '_ {
        Channel::ALL.into_iter().map(|channel| (channel, self.get(channel)))
    }
}
