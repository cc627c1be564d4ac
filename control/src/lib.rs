//! Front panel control of an egg tray moulding line.
//!
//! Three buttons drive a menu shown on a 20x4 character display. The menu
//! is used to tune parameters of the line, persisted in flash, and to run
//! commands: starting the automatic run, testing relays one by one and
//! calibrating the scale.
//!
//! It is meant to run in a firmware polling the buttons every few
//! milliseconds. However, all hardware is hidden behind traits, so it may be
//! run in software as well.
//!
//! ```text
//!    [ InputSource ]                  [ DisplaySink ]
//!          |                                A
//!          | (Snapshot)                     | (Frame)
//!          V                                |
//!     [ Buttons ] --(Events)--> [ Machine ] +
//!                                  |     A
//!                       (Command)  |     | (Effect)
//!                                  V     |
//!       {Settings} <------> [ Engine ] <---> [ Plant ] ---> [ Hardware ]
//!                                |
//!                                V
//!                          {SettingsStore} ---> [ Backend / Flash ]
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod display;
pub mod input;
pub mod layout;
mod log;
pub mod machine;
pub mod menu;
pub mod plant;
pub mod save;
pub mod scale;
pub mod settings;

pub use crate::display::{DisplaySink, Frame, Line};
pub use crate::input::button::{Event, Timing};
pub use crate::input::snapshot::{InputSource, Millis, Snapshot};
pub use crate::machine::Machine;
pub use crate::menu::{Command, Effect, Engine, Executor, Tree};
pub use crate::plant::{Hardware, Plant, Relay};
pub use crate::save::flash::{Flash, FlashBackend};
pub use crate::save::{Backend, SettingsStore};
pub use crate::settings::Settings;
