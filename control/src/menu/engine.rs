//! State machine behind the menu.
//!
//! The engine is either browsing a layer, moving the cursor between its
//! items, or editing a single numeric item. While editing, changes are
//! applied to a draft only. The draft is written to the settings once the
//! user confirms it, or thrown away when the edit is cancelled.

use core::mem;

use heapless::Vec;

use super::command::{Effect, Executor};
use super::tree::{FloatField, IntField, Item, Kind, Layer, LayerId, Tree};
use crate::log;
use crate::save::{Backend, SettingsStore};
use crate::scale::Calibration;
use crate::settings::Settings;

/// Maximum number of nested submenus.
pub const MAX_DEPTH: usize = 10;

// A fast step moves the value by this many steps at once
const FAST_MULTIPLIER: i32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub layer: LayerId,
    pub item: usize,
}

/// Value being edited, not yet applied to the settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Draft {
    Int { field: IntField, value: i32 },
    Float { field: FloatField, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Browsing,
    Editing(Draft),
}

/// The menu, the settings it edits and the store they are persisted in.
///
/// The engine is the only writer of `Settings`. Commands executed from the
/// menu get temporary access to them, everybody else reads them through
/// [`Engine::settings`].
pub struct Engine<B> {
    tree: Tree,
    settings: Settings,
    defaults: Settings,
    store: SettingsStore<B>,
    position: Position,
    mode: Mode,
    stack: Vec<Position, MAX_DEPTH>,
}

impl<B: Backend> Engine<B> {
    /// Build the engine and seed all persisted items from the store.
    ///
    /// Values of the given settings are used wherever the store has nothing
    /// valid to offer.
    pub fn new(tree: Tree, settings: Settings, store: SettingsStore<B>) -> Self {
        let mut engine = Self {
            tree,
            settings,
            defaults: settings,
            store,
            position: Position::default(),
            mode: Mode::Browsing,
            stack: Vec::new(),
        };
        engine.load_all();
        engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SettingsStore<B> {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> SettingsStore<B> {
        self.store
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    pub fn layer(&self) -> LayerId {
        self.position.layer
    }

    pub fn item_index(&self) -> usize {
        self.position.item
    }

    /// Number of submenus entered and not left yet.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_layer(&self) -> Option<&'static Layer> {
        self.tree.layer(self.position.layer)
    }

    pub fn current_item(&self) -> Option<&'static Item> {
        self.tree.item(self.position.layer, self.position.item)
    }

    pub fn navigate_up(&mut self) {
        if self.is_editing() {
            return;
        }
        let len = self.layer_len();
        if len == 0 {
            return;
        }
        self.position.item = if self.position.item == 0 {
            len - 1
        } else {
            self.position.item - 1
        };
    }

    pub fn navigate_down(&mut self) {
        if self.is_editing() {
            return;
        }
        let len = self.layer_len();
        if len == 0 {
            return;
        }
        self.position.item = (self.position.item + 1) % len;
    }

    /// Act on the item under the cursor, or confirm the ongoing edit.
    pub fn select<E: Executor>(&mut self, executor: &mut E) {
        if let Mode::Editing(draft) = mem::replace(&mut self.mode, Mode::Browsing) {
            self.commit(draft);
            return;
        }

        let Some(item) = self.current_item() else {
            log::warning!("Cursor points outside of the tree");
            return;
        };

        match item.kind {
            Kind::Submenu(target) => self.enter(target),
            Kind::Action(command, _) => {
                log::debug!("Executing command={:?}", command);
                let effect = executor.execute(command, &mut self.settings, &mut self.store);
                self.apply(effect);
            }
            Kind::Int(field) => {
                let value = self.settings.int(field.setting);
                self.mode = Mode::Editing(Draft::Int { field, value });
            }
            Kind::Float(field) => {
                let value = self.settings.float(field.setting);
                self.mode = Mode::Editing(Draft::Float { field, value });
            }
            Kind::Toggle(field) => {
                let value = !self.settings.flag(field.setting);
                self.settings.set_flag(field.setting, value);
                self.store.save(field.key, value);
            }
            Kind::Back => self.go_back(),
        }
    }

    /// Cancel the ongoing edit, or return to the previous layer.
    pub fn go_back(&mut self) {
        if self.is_editing() {
            self.mode = Mode::Browsing;
            return;
        }
        if let Some(position) = self.stack.pop() {
            self.position = position;
        }
    }

    pub fn increment(&mut self, fast: bool) {
        self.adjust(1, fast);
    }

    pub fn decrement(&mut self, fast: bool) {
        self.adjust(-1, fast);
    }

    /// Return to the first item of the root layer, dropping any draft.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.position = Position::default();
        self.mode = Mode::Browsing;
    }

    /// Open the given layer as if it was a submenu of the current one.
    pub fn enter(&mut self, layer: LayerId) {
        if self.tree.layer(layer).is_none() {
            log::warning!("Requested nonexistent layer={}", layer);
            return;
        }
        if self.stack.push(self.position).is_err() {
            log::warning!("Menu is nested too deep, ignoring layer={}", layer);
            return;
        }
        self.position = Position { layer, item: 0 };
        self.mode = Mode::Browsing;
    }

    /// Persist every editable item and the scale calibration.
    pub fn save_all(&mut self) {
        for item in self.tree.items() {
            match item.kind {
                Kind::Int(field) => self.store.save(field.key, self.settings.int(field.setting)),
                Kind::Float(field) => {
                    self.store.save(field.key, self.settings.float(field.setting));
                }
                Kind::Toggle(field) => self.store.save(field.key, self.settings.flag(field.setting)),
                _ => (),
            }
        }
        self.settings.calibration.save(&mut self.store);
        log::info!("All settings saved");
    }

    /// Reload every editable item and the scale calibration from the store.
    pub fn load_all(&mut self) {
        for item in self.tree.items() {
            match item.kind {
                Kind::Int(field) => {
                    let current = self.settings.int(field.setting);
                    let value = self.store.load_within(field.key, current, field.min, field.max);
                    self.settings.set_int(field.setting, value);
                }
                Kind::Float(field) => {
                    let current = self.settings.float(field.setting);
                    let value = self.store.load_within(field.key, current, field.min, field.max);
                    self.settings.set_float(field.setting, value);
                }
                Kind::Toggle(field) => {
                    let current = self.settings.flag(field.setting);
                    let value = self.store.load(field.key, current);
                    self.settings.set_flag(field.setting, value);
                }
                _ => (),
            }
        }
        self.settings.calibration = Calibration::load(&self.store);
    }

    /// Reset all settings to the ones the engine was built with and persist
    /// them. The scale calibration is kept.
    pub fn restore_defaults(&mut self) {
        self.settings = Settings {
            calibration: self.settings.calibration,
            ..self.defaults
        };
        self.mode = Mode::Browsing;
        self.save_all();
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::None => (),
            Effect::Back => self.go_back(),
            Effect::Reset => self.reset(),
            Effect::Enter(layer) => self.enter(layer),
            Effect::SaveAll => self.save_all(),
            Effect::RestoreDefaults => self.restore_defaults(),
        }
    }

    fn commit(&mut self, draft: Draft) {
        match draft {
            Draft::Int { field, value } => {
                self.settings.set_int(field.setting, value);
                self.store.save(field.key, value);
            }
            Draft::Float { field, value } => {
                self.settings.set_float(field.setting, value);
                self.store.save(field.key, value);
            }
        }
    }

    fn adjust(&mut self, direction: i32, fast: bool) {
        let multiplier = if fast { FAST_MULTIPLIER } else { 1 };
        match &mut self.mode {
            Mode::Editing(Draft::Int { field, value }) => {
                let delta = field.step.saturating_mul(multiplier * direction);
                *value = value.saturating_add(delta).clamp(field.min, field.max);
            }
            Mode::Editing(Draft::Float { field, value }) => {
                let delta = field.step * (multiplier * direction) as f32;
                let clamped = (*value + delta).clamp(field.min, field.max);
                *value = snap(clamped, field);
            }
            Mode::Browsing => (),
        }
    }

    fn layer_len(&self) -> usize {
        self.current_layer().map_or(0, |layer| layer.items.len())
    }
}

// Move the value onto the nearest `min + k * step`, so repeated steps do
// not drift away from the grid
fn snap(value: f32, field: &FloatField) -> f32 {
    let steps = ((value - field.min) / field.step + 0.5) as i32;
    let snapped = field.min as f64 + steps as f64 * field.step as f64;
    (snapped as f32).clamp(field.min, field.max)
}
