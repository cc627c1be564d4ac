//! Actions invoked from the menu and their effect on navigation.

use super::tree::LayerId;
use crate::plant::Relay;
use crate::save::{Backend, SettingsStore};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    StartAutoRun,
    StopAutoRun,
    EnterTestMode,
    ExitTestMode,
    ToggleRelay(Relay),
    SaveAll,
    RestoreDefaults,
    Tare,
    CalibrateScale,
}

/// State an action item controls, shown next to it on the detailed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Relay(Relay),
}

/// Navigation requested by a command.
///
/// Commands never touch the cursor themselves. The engine applies the
/// effect once the command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    None,
    Back,
    Reset,
    Enter(LayerId),
    SaveAll,
    RestoreDefaults,
}

pub trait Executor {
    fn execute<B: Backend>(
        &mut self,
        command: Command,
        settings: &mut Settings,
        store: &mut SettingsStore<B>,
    ) -> Effect;
}

pub trait Indicators {
    fn is_active(&self, indicator: Indicator) -> bool;
}
