//! Turn raw button readings into discrete events.

pub mod button;
pub mod buttons;
pub mod snapshot;
