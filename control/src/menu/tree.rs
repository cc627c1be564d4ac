//! Static description of menu screens.
//!
//! A tree is a flat list of layers. Submenus refer to their target by its
//! index in that list, and editable items refer to the setting they control
//! through a handle. All of it is validated once, when the tree is built.

use super::command::{Command, Indicator};
use crate::save::MAX_KEY_LEN;
use crate::settings::{BoolSetting, FloatSetting, IntSetting};

pub type LayerId = usize;

pub const MAX_LABEL_LEN: usize = 14;
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntField {
    pub setting: IntSetting,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub unit: &'static str,
    pub key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FloatField {
    pub setting: FloatSetting,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub unit: &'static str,
    pub key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleField {
    pub setting: BoolSetting,
    pub key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Kind {
    Submenu(LayerId),
    Action(Command, Option<Indicator>),
    Int(IntField),
    Float(FloatField),
    Toggle(ToggleField),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Item {
    pub label: &'static str,
    pub kind: Kind,
}

impl Item {
    pub const fn submenu(label: &'static str, target: LayerId) -> Self {
        Self {
            label,
            kind: Kind::Submenu(target),
        }
    }

    pub const fn action(label: &'static str, command: Command) -> Self {
        Self {
            label,
            kind: Kind::Action(command, None),
        }
    }

    pub const fn indicated(label: &'static str, command: Command, indicator: Indicator) -> Self {
        Self {
            label,
            kind: Kind::Action(command, Some(indicator)),
        }
    }

    pub const fn int(label: &'static str, field: IntField) -> Self {
        Self {
            label,
            kind: Kind::Int(field),
        }
    }

    pub const fn float(label: &'static str, field: FloatField) -> Self {
        Self {
            label,
            kind: Kind::Float(field),
        }
    }

    pub const fn toggle(label: &'static str, setting: BoolSetting, key: &'static str) -> Self {
        Self {
            label,
            kind: Kind::Toggle(ToggleField { setting, key }),
        }
    }

    pub const fn back() -> Self {
        Self {
            label: "Back",
            kind: Kind::Back,
        }
    }

    /// Key the item is persisted under, if any.
    pub fn key(&self) -> Option<&'static str> {
        match self.kind {
            Kind::Int(field) => Some(field.key),
            Kind::Float(field) => Some(field.key),
            Kind::Toggle(field) => Some(field.key),
            _ => None,
        }
    }

    pub fn indicator(&self) -> Option<Indicator> {
        match self.kind {
            Kind::Action(_, indicator) => indicator,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layer {
    pub name: &'static str,
    pub items: &'static [Item],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TreeError {
    NoLayers,
    EmptyLayer(LayerId),
    NameTooLong(LayerId),
    LabelTooLong { layer: LayerId, item: usize },
    MissingTarget { layer: LayerId, item: usize },
    InvalidRange { layer: LayerId, item: usize },
    InvalidStep { layer: LayerId, item: usize },
    InvalidKey { layer: LayerId, item: usize },
}

/// Validated set of layers. Layer 0 is the root.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tree {
    layers: &'static [Layer],
}

impl Tree {
    /// # Errors
    ///
    /// This fails when there are no layers, when any layer is empty or
    /// carries a name that would not fit the display, and when any item
    /// has a label too long to display, points to a nonexistent layer,
    /// declares an empty range or a non-positive step, or lacks a usable
    /// storage key.
    pub fn new(layers: &'static [Layer]) -> Result<Self, TreeError> {
        if layers.is_empty() {
            return Err(TreeError::NoLayers);
        }

        for (layer_id, layer) in layers.iter().enumerate() {
            if layer.items.is_empty() {
                return Err(TreeError::EmptyLayer(layer_id));
            }
            if layer.name.len() > MAX_NAME_LEN {
                return Err(TreeError::NameTooLong(layer_id));
            }
            for (item_index, item) in layer.items.iter().enumerate() {
                validate_item(item, layers.len()).map_err(|e| e.at(layer_id, item_index))?;
            }
        }

        Ok(Self { layers })
    }

    pub fn layer(&self, id: LayerId) -> Option<&'static Layer> {
        self.layers.get(id)
    }

    pub fn item(&self, layer: LayerId, item: usize) -> Option<&'static Item> {
        self.layer(layer)?.items.get(item)
    }

    /// Iterate over all items of all layers.
    pub fn items(&self) -> impl Iterator<Item = &'static Item> {
        self.layers.iter().flat_map(|layer| layer.items.iter())
    }
}

enum ItemError {
    LabelTooLong,
    MissingTarget,
    InvalidRange,
    InvalidStep,
    InvalidKey,
}

impl ItemError {
    fn at(self, layer: LayerId, item: usize) -> TreeError {
        match self {
            Self::LabelTooLong => TreeError::LabelTooLong { layer, item },
            Self::MissingTarget => TreeError::MissingTarget { layer, item },
            Self::InvalidRange => TreeError::InvalidRange { layer, item },
            Self::InvalidStep => TreeError::InvalidStep { layer, item },
            Self::InvalidKey => TreeError::InvalidKey { layer, item },
        }
    }
}

fn validate_item(item: &Item, layers: usize) -> Result<(), ItemError> {
    if item.label.len() > MAX_LABEL_LEN {
        return Err(ItemError::LabelTooLong);
    }

    if let Some(key) = item.key() {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(ItemError::InvalidKey);
        }
    }

    match item.kind {
        Kind::Submenu(target) if target >= layers => Err(ItemError::MissingTarget),
        Kind::Int(field) if field.min > field.max => Err(ItemError::InvalidRange),
        Kind::Int(field) if field.step <= 0 => Err(ItemError::InvalidStep),
        Kind::Float(field)
            if !field.min.is_finite() || !field.max.is_finite() || field.min > field.max =>
        {
            Err(ItemError::InvalidRange)
        }
        Kind::Float(field) if !field.step.is_finite() || field.step <= 0.0 => {
            Err(ItemError::InvalidStep)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTES: IntField = IntField {
        setting: IntSetting::MixTime,
        min: 30,
        max: 600,
        step: 10,
        unit: "sec",
        key: "mixTm",
    };

    static LEAF: [Item; 2] = [Item::int("Mix Time", MINUTES), Item::back()];

    #[test]
    fn when_tree_is_well_formed_it_is_accepted() {
        static ROOT: [Item; 1] = [Item::submenu("Mixer", 1)];
        static LAYERS: [Layer; 2] = [
            Layer {
                name: "MAIN",
                items: &ROOT,
            },
            Layer {
                name: "MIXER",
                items: &LEAF,
            },
        ];
        let tree = Tree::new(&LAYERS).unwrap();
        assert_eq!(tree.item(1, 0).unwrap().label, "Mix Time");
        assert!(tree.item(1, 2).is_none());
        assert!(tree.layer(2).is_none());
        assert_eq!(tree.items().count(), 3);
    }

    #[test]
    fn when_there_are_no_layers_it_is_rejected() {
        assert_eq!(Tree::new(&[]).err(), Some(TreeError::NoLayers));
    }

    #[test]
    fn when_layer_is_empty_it_is_rejected() {
        static LAYERS: [Layer; 2] = [
            Layer {
                name: "MAIN",
                items: &LEAF,
            },
            Layer {
                name: "EMPTY",
                items: &[],
            },
        ];
        assert_eq!(Tree::new(&LAYERS).err(), Some(TreeError::EmptyLayer(1)));
    }

    #[test]
    fn when_submenu_points_nowhere_it_is_rejected() {
        static ROOT: [Item; 2] = [Item::back(), Item::submenu("Nowhere", 5)];
        static LAYERS: [Layer; 1] = [Layer {
            name: "MAIN",
            items: &ROOT,
        }];
        assert_eq!(
            Tree::new(&LAYERS).err(),
            Some(TreeError::MissingTarget { layer: 0, item: 1 })
        );
    }

    #[test]
    fn when_range_is_inverted_it_is_rejected() {
        static ROOT: [Item; 1] = [Item::int(
            "Broken",
            IntField {
                min: 10,
                max: 5,
                ..MINUTES
            },
        )];
        static LAYERS: [Layer; 1] = [Layer {
            name: "MAIN",
            items: &ROOT,
        }];
        assert_eq!(
            Tree::new(&LAYERS).err(),
            Some(TreeError::InvalidRange { layer: 0, item: 0 })
        );
    }

    #[test]
    fn when_step_is_not_positive_it_is_rejected() {
        static ROOT: [Item; 1] = [Item::float(
            "Broken",
            FloatField {
                setting: FloatSetting::FlowPerPulse,
                min: 0.5,
                max: 10.0,
                step: 0.0,
                unit: "ml",
                key: "flowCal",
            },
        )];
        static LAYERS: [Layer; 1] = [Layer {
            name: "MAIN",
            items: &ROOT,
        }];
        assert_eq!(
            Tree::new(&LAYERS).err(),
            Some(TreeError::InvalidStep { layer: 0, item: 0 })
        );
    }

    #[test]
    fn when_label_does_not_fit_it_is_rejected() {
        static ROOT: [Item; 1] = [Item::action("Way Too Long Label", Command::SaveAll)];
        static LAYERS: [Layer; 1] = [Layer {
            name: "MAIN",
            items: &ROOT,
        }];
        assert_eq!(
            Tree::new(&LAYERS).err(),
            Some(TreeError::LabelTooLong { layer: 0, item: 0 })
        );
    }

    #[test]
    fn when_key_is_too_long_it_is_rejected() {
        static ROOT: [Item; 1] = [Item::toggle(
            "Flag",
            BoolSetting::StarchByWeight,
            "aKeyThatIsTooLong",
        )];
        static LAYERS: [Layer; 1] = [Layer {
            name: "MAIN",
            items: &ROOT,
        }];
        assert_eq!(
            Tree::new(&LAYERS).err(),
            Some(TreeError::InvalidKey { layer: 0, item: 0 })
        );
    }
}
