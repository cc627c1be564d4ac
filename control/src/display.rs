//! Render the menu state into lines of a character display.

use core::fmt::{self, Write};

use heapless::String;

use crate::menu::command::Indicators;
use crate::menu::engine::{Draft, Engine, Mode};
use crate::menu::tree::{Item, Kind};
use crate::save::Backend;
use crate::settings::Settings;

/// Number of characters fitting on a single line.
pub const WIDTH: usize = 20;

/// A single line of text. Anything written past the width is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(String<WIDTH>);

impl Line {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line = Self::default();
        let _ = line.write_str(text);
        line
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Write for Line {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Everything that should be visible on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// Layer name and the selected item. While editing, the display may
    /// blink a cursor after the value.
    Menu { lines: [Line; 2], editing: bool },
    /// Layer name, the selected item, state of what it controls and a hint.
    Detailed([Line; 4]),
    /// Transient message replacing the menu.
    Status([Line; 2]),
}

impl Frame {
    pub fn lines(&self) -> &[Line] {
        match self {
            Self::Menu { lines, .. } => lines,
            Self::Detailed(lines) => lines,
            Self::Status(lines) => lines,
        }
    }
}

/// Output the frames are drawn to.
///
/// Frames are produced on every tick. It is up to the sink to skip
/// redrawing when nothing changed and to blink the cursor while editing.
pub trait DisplaySink {
    fn show(&mut self, frame: &Frame);
}

/// Two line view of the menu, the layer name over the selected item.
pub fn project<B: Backend>(engine: &Engine<B>) -> Frame {
    Frame::Menu {
        lines: [title(engine), entry(engine)],
        editing: engine.is_editing(),
    }
}

/// Four line view of the menu, showing the state of the controlled output.
pub fn project_detailed<B: Backend, I: Indicators>(engine: &Engine<B>, indicators: &I) -> Frame {
    let indicator = engine.current_item().and_then(Item::indicator);

    let state = match indicator {
        Some(indicator) if indicators.is_active(indicator) => Line::new("State: ON"),
        Some(_) => Line::new("State: OFF"),
        None => Line::default(),
    };

    let hint = if indicator.is_some() {
        Line::new("ENT:Toggle UP/DN:Sel")
    } else {
        Line::new("ENT:Select UP/DN:Sel")
    };

    Frame::Detailed([title(engine), entry(engine), state, hint])
}

pub fn status(message: &str) -> Frame {
    Frame::Status([Line::new("Status:"), Line::new(message)])
}

fn title<B: Backend>(engine: &Engine<B>) -> Line {
    engine
        .current_layer()
        .map_or_else(Line::default, |layer| Line::new(layer.name))
}

fn entry<B: Backend>(engine: &Engine<B>) -> Line {
    let mut line = Line::default();
    if let Some(item) = engine.current_item() {
        let _ = write_entry(&mut line, item, engine.mode(), engine.settings());
    }
    line
}

fn write_entry(line: &mut Line, item: &Item, mode: Mode, settings: &Settings) -> fmt::Result {
    write!(line, ">{}", item.label)?;
    match (mode, item.kind) {
        (Mode::Editing(Draft::Int { field, value }), _) => write!(line, ":{}{}", value, field.unit),
        (Mode::Editing(Draft::Float { field, value }), _) => {
            write!(line, ":{:.1}{}", value, field.unit)
        }
        (Mode::Browsing, Kind::Int(field)) => {
            write!(line, ":{}{}", settings.int(field.setting), field.unit)
        }
        (Mode::Browsing, Kind::Float(field)) => {
            write!(line, ":{:.1}{}", settings.float(field.setting), field.unit)
        }
        (Mode::Browsing, Kind::Toggle(field)) => {
            let state = if settings.flag(field.setting) { "ON" } else { "OFF" };
            write!(line, ":{}", state)
        }
        _ => Ok(()),
    }
}
