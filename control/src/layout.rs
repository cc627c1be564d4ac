//! Menu of the egg tray moulding line.

use crate::menu::command::{Command, Indicator};
use crate::menu::tree::{FloatField, IntField, Item, Layer, LayerId, Tree, TreeError};
use crate::plant::Relay;
use crate::settings::{BoolSetting, FloatSetting, IntSetting};

/// Namespace all settings of the line are persisted under.
pub const NAMESPACE: &str = "egg-tray";

pub const MAIN: LayerId = 0;
pub const SETTINGS: LayerId = 1;
pub const WATER: LayerId = 2;
pub const STARCH: LayerId = 3;
pub const SHREDDER: LayerId = 4;
pub const MIXER: LayerId = 5;
pub const PUMP: LayerId = 6;
pub const MOULDING: LayerId = 7;
pub const DRYING: LayerId = 8;
pub const SCALE: LayerId = 9;
pub const TEST: LayerId = 10;
pub const RUNNING: LayerId = 11;

const fn int(
    label: &'static str,
    setting: IntSetting,
    (min, max, step): (i32, i32, i32),
    unit: &'static str,
    key: &'static str,
) -> Item {
    Item::int(
        label,
        IntField {
            setting,
            min,
            max,
            step,
            unit,
            key,
        },
    )
}

const fn relay(label: &'static str, relay: Relay) -> Item {
    Item::indicated(label, Command::ToggleRelay(relay), Indicator::Relay(relay))
}

static MAIN_ITEMS: [Item; 3] = [
    Item::submenu("Settings", SETTINGS),
    Item::action("Run Auto", Command::StartAutoRun),
    Item::action("Test Machine", Command::EnterTestMode),
];

static SETTINGS_ITEMS: [Item; 11] = [
    Item::submenu("Water", WATER),
    Item::submenu("Starch", STARCH),
    Item::submenu("Shredder", SHREDDER),
    Item::submenu("Mixer", MIXER),
    Item::submenu("Pump", PUMP),
    Item::submenu("Moulding", MOULDING),
    Item::submenu("Drying", DRYING),
    Item::submenu("Scale", SCALE),
    Item::action("Save All", Command::SaveAll),
    Item::action("Defaults", Command::RestoreDefaults),
    Item::back(),
];

static WATER_ITEMS: [Item; 4] = [
    int("Amount", IntSetting::WaterAmount, (100, 5000, 50), "ml", "waterAmt"),
    int("Timeout", IntSetting::WaterFlowTimeout, (10, 300, 5), "sec", "waterTmo"),
    Item::float(
        "Flow/Pulse",
        FloatField {
            setting: FloatSetting::FlowPerPulse,
            min: 0.5,
            max: 10.0,
            step: 0.1,
            unit: "ml",
            key: "flowCal",
        },
    ),
    Item::back(),
];

static STARCH_ITEMS: [Item; 4] = [
    int("Weight", IntSetting::StarchWeight, (100, 2000, 50), "g", "starchWt"),
    int("Dispense Time", IntSetting::StarchDispenseTime, (5, 60, 1), "sec", "starchTm"),
    Item::toggle("By Weight", BoolSetting::StarchByWeight, "starchByWt"),
    Item::back(),
];

static SHREDDER_ITEMS: [Item; 2] = [
    int("Run Time", IntSetting::ShredderTime, (10, 120, 5), "sec", "shredTm"),
    Item::back(),
];

static MIXER_ITEMS: [Item; 3] = [
    int("Mix Time", IntSetting::MixTime, (30, 600, 10), "sec", "mixTm"),
    int("Mix Speed", IntSetting::MixSpeed, (0, 100, 5), "%", "mixSpd"),
    Item::back(),
];

static PUMP_ITEMS: [Item; 3] = [
    int("Pump Time", IntSetting::PumpTime, (10, 300, 5), "sec", "pumpTm"),
    int("Conveyor", IntSetting::ConveyorSpeed, (0, 100, 5), "%", "convSpd"),
    Item::back(),
];

static MOULDING_ITEMS: [Item; 4] = [
    int("Suction Time", IntSetting::MouldSuctionTime, (3, 30, 1), "sec", "mldSucTm"),
    int("Blower Time", IntSetting::MouldBlowerTime, (2, 20, 1), "sec", "mldBlwTm"),
    int("Cycle Delay", IntSetting::MouldCycleDelay, (1, 10, 1), "sec", "mldDly"),
    Item::back(),
];

static DRYING_ITEMS: [Item; 3] = [
    int("Dry Time", IntSetting::DryingTime, (60, 600, 30), "sec", "dryTm"),
    int("Temperature", IntSetting::DryingTemp, (50, 120, 5), "C", "dryTemp"),
    Item::back(),
];

static SCALE_ITEMS: [Item; 4] = [
    int("Cal Weight", IntSetting::ScaleCalibrationWeight, (100, 5000, 50), "g", "scaleCalWt"),
    Item::action("Tare", Command::Tare),
    Item::action("Calibrate", Command::CalibrateScale),
    Item::back(),
];

static TEST_ITEMS: [Item; 18] = [
    relay("Heater", Relay::Heater),
    relay("Valve", Relay::Valve),
    relay("Shredder Pwr", Relay::ShredderPower),
    relay("Mixer", Relay::Mixer),
    relay("Pump", Relay::Pump),
    relay("Screw", Relay::Screw),
    relay("Conveyor", Relay::Conveyor),
    relay("Shredder Trig", Relay::ShredderTrigger),
    relay("Linear Door", Relay::LinearDoor),
    relay("Vacuum", Relay::Vacuum),
    relay("Blower", Relay::Blower),
    relay("Mould A", Relay::MouldA),
    relay("Vacuum A/B", Relay::VacuumAB),
    relay("Blower A/B", Relay::BlowerAB),
    relay("Mould B", Relay::MouldB),
    relay("Fwd/Rev", Relay::ForwardReverse),
    relay("Up/Down", Relay::UpDown),
    Item::action("Exit Test", Command::ExitTestMode),
];

static RUNNING_ITEMS: [Item; 1] = [Item::action("Stop", Command::StopAutoRun)];

pub static LAYERS: [Layer; 12] = [
    Layer {
        name: "MAIN MENU",
        items: &MAIN_ITEMS,
    },
    Layer {
        name: "SETTINGS",
        items: &SETTINGS_ITEMS,
    },
    Layer {
        name: "WATER",
        items: &WATER_ITEMS,
    },
    Layer {
        name: "STARCH",
        items: &STARCH_ITEMS,
    },
    Layer {
        name: "SHREDDER",
        items: &SHREDDER_ITEMS,
    },
    Layer {
        name: "MIXER",
        items: &MIXER_ITEMS,
    },
    Layer {
        name: "PUMP",
        items: &PUMP_ITEMS,
    },
    Layer {
        name: "MOULDING",
        items: &MOULDING_ITEMS,
    },
    Layer {
        name: "DRYING",
        items: &DRYING_ITEMS,
    },
    Layer {
        name: "SCALE",
        items: &SCALE_ITEMS,
    },
    Layer {
        name: "TEST MACHINE",
        items: &TEST_ITEMS,
    },
    Layer {
        name: "RUNNING",
        items: &RUNNING_ITEMS,
    },
];

/// # Errors
///
/// Fails only if the static tables above are inconsistent.
pub fn tree() -> Result<Tree, TreeError> {
    Tree::new(&LAYERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::tree::Kind;
    use crate::settings::Settings;

    #[test]
    fn when_built_the_tree_is_valid() {
        assert!(tree().is_ok());
    }

    #[test]
    fn when_keys_are_listed_none_repeats() {
        let tree = tree().unwrap();
        let keys: heapless::Vec<&str, 32> = tree.items().filter_map(Item::key).collect();
        assert_eq!(keys.len(), 17);
        for (i, key) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(key), "{key} is repeated");
        }
    }

    #[test]
    fn when_settings_are_default_every_value_lies_within_its_range() {
        let settings = Settings::default();
        for item in tree().unwrap().items() {
            match item.kind {
                Kind::Int(field) => {
                    let value = settings.int(field.setting);
                    assert!((field.min..=field.max).contains(&value), "{}", item.label);
                }
                Kind::Float(field) => {
                    let value = settings.float(field.setting);
                    assert!(value >= field.min && value <= field.max, "{}", item.label);
                }
                _ => (),
            }
        }
    }

    #[test]
    fn when_every_relay_is_listed_in_test_menu_once() {
        for relay in Relay::ALL {
            let count = TEST_ITEMS
                .iter()
                .filter(|item| item.indicator() == Some(Indicator::Relay(relay)))
                .count();
            assert_eq!(count, 1);
        }
    }
}
