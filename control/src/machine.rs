//! Glue of the control loop.
//!
//! ```text
//!   [ InputSource ] --(Snapshot)--> [ Buttons ] --(Events)--> [ Engine ]
//!                                                              |    A
//!                                                    (Command) |    | (Effect)
//!                                                              V    |
//!   [ DisplaySink ] <--(Frame)-- [ display ] <---------------- [ Plant ]
//! ```

use crate::display::{self, DisplaySink, Frame};
use crate::input::button::{Event, Timing};
use crate::input::buttons::{Buttons, Events};
use crate::input::snapshot::{InputSource, Millis, Snapshot};
use crate::menu::engine::{Engine, Mode};
use crate::plant::{Hardware, Plant};
use crate::save::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Overlay {
    message: &'static str,
    since: Millis,
    duration: Millis,
}

impl Overlay {
    fn is_over(&self, now: Millis) -> bool {
        now.wrapping_sub(self.since) >= self.duration
    }
}

/// Everything needed to run one iteration of the control loop.
pub struct Machine<B, H> {
    buttons: Buttons,
    engine: Engine<B>,
    plant: Plant<H>,
    overlay: Option<Overlay>,
}

impl<B: Backend, H: Hardware> Machine<B, H> {
    pub fn new(engine: Engine<B>, plant: Plant<H>) -> Self {
        Self::with_timing(engine, plant, Timing::default())
    }

    pub fn with_timing(engine: Engine<B>, plant: Plant<H>, timing: Timing) -> Self {
        Self {
            buttons: Buttons::new(timing),
            engine,
            plant,
            overlay: None,
        }
    }

    pub fn engine(&self) -> &Engine<B> {
        &self.engine
    }

    pub fn plant(&self) -> &Plant<H> {
        &self.plant
    }

    /// Sample the input, process it and show the result.
    pub fn run_once<S: InputSource, D: DisplaySink>(&mut self, source: &mut S, sink: &mut D) {
        let frame = self.tick(source.sample());
        sink.show(&frame);
    }

    /// Process a single snapshot of the buttons and build the frame
    /// reflecting the resulting state.
    ///
    /// Buttons are debounced on every tick, but their events are ignored
    /// while a status message is shown.
    pub fn tick(&mut self, snapshot: Snapshot) -> Frame {
        let events = self.buttons.update(snapshot);

        if let Some(overlay) = self.overlay {
            if overlay.is_over(snapshot.now) {
                self.overlay = None;
            }
        }

        if self.overlay.is_none() {
            self.dispatch(events);
        }

        if let Some(status) = self.plant.take_status() {
            self.overlay = Some(Overlay {
                message: status.message,
                since: snapshot.now,
                duration: status.duration,
            });
        }

        if let Some(overlay) = self.overlay {
            display::status(overlay.message)
        } else if self.plant.is_test_mode() {
            display::project_detailed(&self.engine, &self.plant)
        } else {
            display::project(&self.engine)
        }
    }

    fn dispatch(&mut self, events: Events) {
        match self.engine.mode() {
            Mode::Browsing => {
                if events.up == Event::Pressed {
                    self.engine.navigate_up();
                }
                if events.down == Event::Pressed {
                    self.engine.navigate_down();
                }
                if events.enter == Event::Pressed {
                    self.engine.select(&mut self.plant);
                }
            }
            Mode::Editing(_) => {
                let chord = (events.up == Event::Pressed && self.buttons.down.is_pressed())
                    || (events.down == Event::Pressed && self.buttons.up.is_pressed());
                if chord {
                    self.engine.go_back();
                    return;
                }

                if events.up.is_step() {
                    self.engine.increment(false);
                } else if events.up.is_fast_step() {
                    self.engine.increment(true);
                }
                if events.down.is_step() {
                    self.engine.decrement(false);
                } else if events.down.is_fast_step() {
                    self.engine.decrement(true);
                }
                if events.enter == Event::Pressed {
                    self.engine.select(&mut self.plant);
                }
            }
        }
    }
}
