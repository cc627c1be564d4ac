//! Volatile backend keeping all pairs in RAM.

use heapless::{String, Vec};

use super::{Backend, Error, Value, MAX_KEY_LEN};

pub type Key = String<MAX_KEY_LEN>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Entry {
    pub key: Key,
    pub value: Value,
}

/// Up to `N` key/value pairs, in the order they were first written.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend<const N: usize> {
    entries: Vec<Entry, N>,
}

impl<const N: usize> MemoryBackend<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), e.value))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|e| e.key.as_str() == key)
            .map(|e| e.value)
    }
}

impl<const N: usize> Backend for MemoryBackend<N> {
    fn read(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), Error> {
        if key.len() > MAX_KEY_LEN {
            return Err(Error::KeyTooLong);
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.key.as_str() == key) {
            entry.value = value;
            return Ok(());
        }

        let mut owned = Key::new();
        owned.push_str(key).map_err(|_| Error::KeyTooLong)?;
        self.entries
            .push(Entry { key: owned, value })
            .map_err(|_| Error::Full)
    }
}
