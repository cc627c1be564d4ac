//! Debounce all three front panel buttons from a single snapshot.

use super::button::{Button, Event, Timing};
use super::snapshot::Snapshot;

/// Events produced by all buttons during one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    pub enter: Event,
    pub up: Event,
    pub down: Event,
}

impl Default for Events {
    fn default() -> Self {
        Self {
            enter: Event::Idle,
            up: Event::Idle,
            down: Event::Idle,
        }
    }
}

impl Events {
    pub fn is_idle(&self) -> bool {
        self.enter == Event::Idle && self.up == Event::Idle && self.down == Event::Idle
    }
}

#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    pub enter: Button,
    pub up: Button,
    pub down: Button,
}

impl Buttons {
    #[must_use]
    pub fn new(timing: Timing) -> Self {
        Self {
            enter: Button::new(timing),
            up: Button::new(timing),
            down: Button::new(timing),
        }
    }

    /// Update Enter, Up and Down, in this order, with the snapshot's time.
    pub fn update(&mut self, snapshot: Snapshot) -> Events {
        let enter = self.enter.update(snapshot.enter, snapshot.now);
        let up = self.up.update(snapshot.up, snapshot.now);
        let down = self.down.update(snapshot.down, snapshot.now);
        Events { enter, up, down }
    }

    pub fn reset(&mut self) {
        self.enter.reset();
        self.up.reset();
        self.down.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(enter: bool, up: bool, down: bool, now: u32) -> Snapshot {
        Snapshot {
            enter,
            up,
            down,
            now,
        }
    }

    #[test]
    fn when_nothing_is_held_it_reports_idle() {
        let mut buttons = Buttons::default();
        for now in 0..10 {
            assert!(buttons.update(snapshot(false, false, false, now)).is_idle());
        }
    }

    #[test]
    fn when_single_button_is_held_only_its_event_is_reported() {
        let mut buttons = Buttons::default();
        buttons.update(snapshot(false, true, false, 0));
        let events = buttons.update(snapshot(false, true, false, 1));
        assert_eq!(
            events,
            Events {
                enter: Event::Idle,
                up: Event::Pressed,
                down: Event::Idle,
            }
        );
    }

    #[test]
    fn when_two_buttons_are_held_both_are_reported() {
        let mut buttons = Buttons::default();
        buttons.update(snapshot(false, true, true, 0));
        let events = buttons.update(snapshot(false, true, true, 1));
        assert_eq!(events.up, Event::Pressed);
        assert_eq!(events.down, Event::Pressed);
        assert_eq!(events.enter, Event::Idle);
    }

    #[test]
    fn when_reset_while_held_buttons_press_again() {
        let mut buttons = Buttons::default();
        buttons.update(snapshot(true, false, false, 0));
        assert_eq!(
            buttons.update(snapshot(true, false, false, 1)).enter,
            Event::Pressed
        );
        buttons.reset();
        assert!(!buttons.enter.is_pressed());
        assert_eq!(
            buttons.update(snapshot(true, false, false, 2)).enter,
            Event::Pressed
        );
    }

    #[test]
    fn when_custom_timing_is_given_all_buttons_use_it() {
        let mut buttons = Buttons::new(Timing {
            long_press: 5,
            ..Timing::default()
        });
        buttons.update(snapshot(false, false, true, 0));
        buttons.update(snapshot(false, false, true, 1));
        assert_eq!(
            buttons.update(snapshot(false, false, true, 6)).down,
            Event::LongPress
        );
    }
}
