//! Navigate a tree of configuration screens and edit settings in place.

pub mod command;
pub mod engine;
pub mod tree;

pub use command::{Command, Effect, Executor, Indicator, Indicators};
pub use engine::{Draft, Engine, Mode, Position, MAX_DEPTH};
pub use tree::{FloatField, IntField, Item, Kind, Layer, LayerId, ToggleField, Tree, TreeError};
