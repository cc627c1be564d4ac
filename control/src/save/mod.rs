//! Persist settings as typed key/value pairs.
//!
//! The store is generic over a [`Backend`], a minimal key/value interface
//! that may be backed by RAM, by flash or by anything the application
//! provides. Values read back from a backend are always validated before
//! they reach the caller, and any failure falls back to the default.

pub mod flash;
pub mod memory;
pub mod record;

use crate::log;

/// Longest key accepted by backends, in bytes.
pub const MAX_KEY_LEN: usize = 15;

/// A persisted value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    KeyTooLong,
    Full,
    Corrupted,
    Flash,
}

/// Key/value storage the settings are persisted through.
pub trait Backend {
    /// # Errors
    ///
    /// Fails when the underlying storage cannot be read or holds invalid
    /// data. A missing key is not an error, it is returned as `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<Value>, Error>;

    /// # Errors
    ///
    /// Fails when the key is too long, when there is no space left or when
    /// the underlying storage refused the write.
    fn write(&mut self, key: &str, value: Value) -> Result<(), Error>;
}

/// Types that can be stored in a [`Backend`].
pub trait Scalar: Copy + PartialOrd {
    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;

    /// Whether a recovered value can be trusted.
    fn is_sane(self) -> bool {
        true
    }
}

impl Scalar for i32 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(x) => Some(x),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(x),
            _ => None,
        }
    }

    fn is_sane(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(x) => Some(x),
            _ => None,
        }
    }
}

/// Typed access to a backend.
///
/// Neither loading nor saving ever fails towards the caller. Problems are
/// logged and the default value is used instead.
#[derive(Debug, Default)]
pub struct SettingsStore<B> {
    backend: B,
}

impl<B: Backend> SettingsStore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Load the value stored under `key`, or `default` when it is missing,
    /// of a different type or not sane.
    pub fn load<T: Scalar>(&self, key: &str, default: T) -> T {
        match self.backend.read(key) {
            Ok(Some(value)) => match T::from_value(value) {
                Some(x) if x.is_sane() => x,
                _ => {
                    log::warning!("Ignoring invalid value of key={}", key);
                    default
                }
            },
            Ok(None) => default,
            Err(_err) => {
                log::warning!("Failed reading key={}: {:?}", key, _err);
                default
            }
        }
    }

    /// Like [`load`](Self::load), but also falls back to `default` when the
    /// recovered value lies outside of `[min, max]`.
    pub fn load_within<T: Scalar>(&self, key: &str, default: T, min: T, max: T) -> T {
        let value = self.load(key, default);
        if value < min || value > max {
            log::warning!("Value of key={} is out of range, using default", key);
            default
        } else {
            value
        }
    }

    pub fn save<T: Scalar>(&mut self, key: &str, value: T) {
        if let Err(_err) = self.backend.write(key, value.into_value()) {
            log::warning!("Failed saving key={}: {:?}", key, _err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;

    type Store = SettingsStore<MemoryBackend<8>>;

    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<Value>, Error> {
            Err(Error::Corrupted)
        }

        fn write(&mut self, _key: &str, _value: Value) -> Result<(), Error> {
            Err(Error::Flash)
        }
    }

    #[test]
    fn when_key_is_missing_it_loads_default() {
        let store = Store::default();
        assert_eq!(store.load("mixTm", 120), 120);
    }

    #[test]
    fn when_value_was_saved_it_is_loaded_back() {
        let mut store = Store::default();
        store.save("mixTm", 240);
        store.save("flowCal", 3.5_f32);
        store.save("starchByWt", false);
        assert_eq!(store.load("mixTm", 120), 240);
        assert_relative_eq!(store.load("flowCal", 2.2_f32), 3.5);
        assert!(!store.load("starchByWt", true));
    }

    #[test]
    fn when_stored_type_differs_it_loads_default() {
        let mut store = Store::default();
        store.save("mixTm", true);
        assert_eq!(store.load("mixTm", 120), 120);
    }

    #[test]
    fn when_float_is_not_finite_it_loads_default() {
        let mut store = Store::default();
        store.save("flowCal", f32::NAN);
        assert_relative_eq!(store.load("flowCal", 2.2_f32), 2.2);
        store.save("flowCal", f32::INFINITY);
        assert_relative_eq!(store.load("flowCal", 2.2_f32), 2.2);
    }

    #[test]
    fn when_value_is_out_of_range_it_loads_default() {
        let mut store = Store::default();
        store.save("mixSpd", 150);
        assert_eq!(store.load_within("mixSpd", 100, 0, 100), 100);
        store.save("mixSpd", 40);
        assert_eq!(store.load_within("mixSpd", 100, 0, 100), 40);
    }

    #[test]
    fn when_backend_fails_it_falls_back_silently() {
        let mut store = SettingsStore::new(BrokenBackend);
        store.save("mixTm", 10);
        assert_eq!(store.load("mixTm", 120), 120);
    }
}
