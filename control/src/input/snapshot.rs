//! Structures used to pass the current state of hardware peripherals.

/// Monotonic timestamp in milliseconds. It is allowed to wrap around.
pub type Millis = u32;

/// The current state of all buttons.
///
/// `Snapshot` is meant to be passed from the hardware binding to the
/// control package. Each reading must already be translated to "active",
/// e.g. an active-low pin with pull-up reads `true` when it is low.
/// Debouncing is done by the control package.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub enter: bool,
    pub up: bool,
    pub down: bool,
    pub now: Millis,
}

/// Source of raw button readings.
///
/// Implement this for whatever sits between the pins and the controller,
/// be it direct GPIO or an I/O expander.
pub trait InputSource {
    fn sample(&mut self) -> Snapshot;
}
