//! Manage button's state.

use super::snapshot::Millis;

/// Timing windows of press detection, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub long_press: Millis,
    pub fast_scroll: Millis,
    pub fast_repeat: Millis,
    pub slow_repeat: Millis,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            long_press: 1000,
            fast_scroll: 3000,
            fast_repeat: 100,
            slow_repeat: 500,
        }
    }
}

/// Discrete event produced by a single poll of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Idle,
    Pressed,
    Released,
    LongPress,
    FastRepeat,
    SlowRepeat,
}

impl Event {
    /// Whether the event should move an edited value by a single step.
    pub fn is_step(self) -> bool {
        matches!(self, Self::Pressed | Self::SlowRepeat)
    }

    pub fn is_fast_step(self) -> bool {
        matches!(self, Self::FastRepeat)
    }
}

/// Use this to hold button's state over time.
///
/// The button must read the same value on two consecutive polls before the
/// change is trusted. Once pressed, holding it produces a single long press
/// followed by slow and eventually fast repeats. Polls do not need to be
/// evenly spaced, all the windows are evaluated against elapsed time.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Button {
    timing: Timing,
    last_sample: bool,
    pressed: bool,
    press_start: Millis,
    last_repeat: Millis,
    long_press_fired: bool,
}

impl Button {
    #[must_use]
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn update(&mut self, active: bool, now: Millis) -> Event {
        if active != self.last_sample {
            self.last_sample = active;
            return Event::Idle;
        }

        if active && !self.pressed {
            self.pressed = true;
            self.press_start = now;
            self.last_repeat = now;
            self.long_press_fired = false;
            return Event::Pressed;
        }

        if !active && self.pressed {
            self.pressed = false;
            self.long_press_fired = false;
            return Event::Released;
        }

        if active {
            return self.update_held(now);
        }

        Event::Idle
    }

    fn update_held(&mut self, now: Millis) -> Event {
        let held = now.wrapping_sub(self.press_start);
        let since_repeat = now.wrapping_sub(self.last_repeat);

        if !self.long_press_fired && held >= self.timing.long_press {
            self.long_press_fired = true;
            Event::LongPress
        } else if held >= self.timing.fast_scroll {
            if since_repeat >= self.timing.fast_repeat {
                self.last_repeat = now;
                Event::FastRepeat
            } else {
                Event::Idle
            }
        } else if self.long_press_fired && since_repeat >= self.timing.slow_repeat {
            self.last_repeat = now;
            Event::SlowRepeat
        } else {
            Event::Idle
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Forget any ongoing press. The last raw sample is kept, so a button
    /// that is still held down is reported as pressed again on the next poll.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.long_press_fired = false;
        self.press_start = 0;
        self.last_repeat = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hold(
        button: &mut Button,
        from: Millis,
        to: Millis,
        period: Millis,
    ) -> heapless::Vec<(Millis, Event), 512> {
        let mut events = heapless::Vec::new();
        let mut now = from;
        while now <= to {
            let event = button.update(true, now);
            if event != Event::Idle {
                events.push((now, event)).unwrap();
            }
            now += period;
        }
        events
    }

    fn pressed_at(now: Millis) -> Button {
        let mut button = Button::default();
        assert_eq!(button.update(true, now - 1), Event::Idle);
        assert_eq!(button.update(true, now), Event::Pressed);
        button
    }

    #[test]
    fn when_signal_changes_it_waits_for_second_identical_sample() {
        let mut button = Button::default();
        assert_eq!(button.update(true, 0), Event::Idle);
        assert!(!button.is_pressed());
        assert_eq!(button.update(true, 10), Event::Pressed);
        assert!(button.is_pressed());
    }

    #[test]
    fn when_signal_bounces_it_never_reports_press() {
        let mut button = Button::default();
        for i in 0..100 {
            assert_eq!(button.update(i % 2 == 0, i), Event::Idle);
        }
        assert!(!button.is_pressed());
    }

    #[test]
    fn when_released_stably_it_reports_release_once() {
        let mut button = pressed_at(10);
        assert_eq!(button.update(false, 20), Event::Idle);
        assert_eq!(button.update(false, 30), Event::Released);
        assert_eq!(button.update(false, 40), Event::Idle);
        assert!(!button.is_pressed());
    }

    #[test]
    fn when_single_glitch_appears_during_hold_it_is_absorbed() {
        let mut button = pressed_at(10);
        assert_eq!(button.update(false, 20), Event::Idle);
        assert_eq!(button.update(true, 30), Event::Idle);
        assert_eq!(button.update(true, 40), Event::Idle);
        assert!(button.is_pressed());
    }

    #[test]
    fn when_held_for_a_second_it_fires_single_long_press() {
        let mut button = pressed_at(1);
        let events = hold(&mut button, 2, 1000, 1);
        assert!(events.is_empty());
        let events = hold(&mut button, 1001, 1001, 1);
        assert_eq!(&events[..], &[(1001, Event::LongPress)]);
    }

    #[test]
    fn when_held_between_long_press_and_fast_scroll_it_repeats_slowly() {
        let mut button = pressed_at(1);
        let events = hold(&mut button, 2, 3000, 1);
        let long_presses = events.iter().filter(|(_, e)| *e == Event::LongPress).count();
        assert_eq!(long_presses, 1);

        let repeats: heapless::Vec<Millis, 16> = events
            .iter()
            .filter(|(_, e)| *e == Event::SlowRepeat)
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(&repeats[..], &[1002, 1502, 2002, 2502]);
        assert!(events.iter().all(|(_, e)| *e != Event::FastRepeat));
    }

    #[test]
    fn when_held_past_fast_scroll_it_repeats_quickly() {
        let mut button = pressed_at(1);
        let _ = hold(&mut button, 2, 3000, 1);
        let events = hold(&mut button, 3001, 3500, 1);
        let times: heapless::Vec<Millis, 16> = events.iter().map(|(t, _)| *t).collect();
        assert!(events.iter().all(|(_, e)| *e == Event::FastRepeat));
        assert_eq!(&times[..], &[3001, 3101, 3201, 3301, 3401]);
    }

    #[test]
    fn when_polled_irregularly_it_still_fires_long_press() {
        let mut button = pressed_at(100);
        assert_eq!(button.update(true, 700), Event::Idle);
        assert_eq!(button.update(true, 1350), Event::LongPress);
        assert_eq!(button.update(true, 1400), Event::SlowRepeat);
    }

    #[test]
    fn when_timer_wraps_around_it_measures_elapsed_time() {
        let start = Millis::MAX - 400;
        let mut button = pressed_at(start);
        assert_eq!(button.update(true, start.wrapping_add(999)), Event::Idle);
        assert_eq!(button.update(true, start.wrapping_add(1000)), Event::LongPress);
    }

    #[test]
    fn when_released_after_long_press_next_press_starts_fresh() {
        let mut button = pressed_at(1);
        let _ = hold(&mut button, 2, 1200, 1);
        assert_eq!(button.update(false, 1201), Event::Idle);
        assert_eq!(button.update(false, 1202), Event::Released);
        assert_eq!(button.update(true, 1203), Event::Idle);
        assert_eq!(button.update(true, 1204), Event::Pressed);
        assert_eq!(button.update(true, 1500), Event::Idle);
    }

    #[test]
    fn when_reset_while_held_it_reports_press_again() {
        let mut button = pressed_at(1);
        button.reset();
        assert!(!button.is_pressed());
        assert_eq!(button.update(true, 5), Event::Pressed);
    }

    #[test]
    fn when_custom_timing_is_given_it_is_respected() {
        let mut button = Button::new(Timing {
            long_press: 10,
            ..Timing::default()
        });
        button.update(true, 0);
        assert_eq!(button.update(true, 1), Event::Pressed);
        assert_eq!(button.update(true, 11), Event::LongPress);
    }

    proptest! {
        #[test]
        fn pressed_is_reported_at_most_once_per_stable_activation(
            samples in proptest::collection::vec(any::<bool>(), 1..200)
        ) {
            let mut button = Button::default();
            let mut previous = false;
            let mut stable;
            let mut presses_since_release = 0;
            for (i, sample) in samples.iter().enumerate() {
                let event = button.update(*sample, i as Millis);
                stable = *sample == previous;
                previous = *sample;

                if event == Event::Pressed {
                    prop_assert!(*sample && stable);
                    presses_since_release += 1;
                    prop_assert_eq!(presses_since_release, 1);
                }
                if event == Event::Released {
                    prop_assert!(!*sample && stable);
                    presses_since_release = 0;
                }
            }
        }
    }
}
