//! Persist pairs in flash, rotating through sectors to spread wear.
//!
//! Every write stores a complete [`Record`] with an incremented version in
//! the next sector. On start, all sectors are scanned and the newest valid
//! record of the namespace wins. A write interrupted by power loss leaves a
//! sector failing its CRC check, and the previous version is used instead.

use super::memory::MemoryBackend;
use super::record::Record;
use super::{Backend, Error, Value};
use crate::log;

/// Maximum number of pairs kept by [`FlashBackend`].
pub const MAX_ENTRIES: usize = 32;

/// Raw flash divided into sectors of at least `Record::SIZE` bytes.
pub trait Flash {
    fn sectors(&self) -> usize;

    /// # Errors
    ///
    /// Fails when the sector cannot be read.
    fn read(&mut self, sector: usize, buffer: &mut [u8; Record::SIZE]) -> Result<(), Error>;

    /// Erase the sector and store the data in it.
    ///
    /// # Errors
    ///
    /// Fails when the sector cannot be written.
    fn write(&mut self, sector: usize, data: &[u8; Record::SIZE]) -> Result<(), Error>;
}

pub struct FlashBackend<F> {
    flash: F,
    namespace: &'static str,
    map: MemoryBackend<MAX_ENTRIES>,
    version: u32,
}

impl<F: Flash> FlashBackend<F> {
    /// Recover the newest valid record of the namespace.
    ///
    /// If there is none, or the flash cannot be read, the backend starts
    /// empty and callers fall back to defaults.
    pub fn open(mut flash: F, namespace: &'static str) -> Self {
        let mut latest: Option<Record> = None;

        for sector in 0..flash.sectors() {
            let mut buffer = [0; Record::SIZE];
            if flash.read(sector, &mut buffer).is_err() {
                log::warning!("Failed reading sector={}", sector);
                continue;
            }

            if let Ok(record) = Record::from_bytes(buffer) {
                if record.namespace() != namespace {
                    continue;
                }
                if latest.map_or(true, |current| record.version() > current.version()) {
                    latest = Some(record);
                }
            }
        }

        let mut map = MemoryBackend::new();
        let version = if let Some(record) = latest {
            for (key, value) in record.entries() {
                if map.write(key, value).is_err() {
                    log::warning!("Dropping stored key={}", key);
                }
            }
            log::info!("Loaded save version={}", record.version());
            record.version().wrapping_add(1)
        } else {
            log::info!("No valid save was found");
            0
        };

        Self {
            flash,
            namespace,
            map,
            version,
        }
    }

    /// Version the next write will be stored with.
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn into_flash(self) -> F {
        self.flash
    }
}

impl<F: Flash> Backend for FlashBackend<F> {
    fn read(&self, key: &str) -> Result<Option<Value>, Error> {
        self.map.read(key)
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), Error> {
        if self.map.get(key) == Some(value) {
            return Ok(());
        }

        let sectors = self.flash.sectors();
        if sectors == 0 {
            return Err(Error::Flash);
        }

        let mut map = self.map.clone();
        map.write(key, value)?;
        let record = Record::new(self.namespace, self.version, map.entries())?;

        log::debug!("Saving version={} key={}", self.version, key);
        let sector = self.version as usize % sectors;
        self.flash.write(sector, &record.to_bytes())?;

        self.map = map;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }
}

/// Flash emulated in RAM, starting erased.
pub struct MemoryFlash<const SECTORS: usize> {
    sectors: [[u8; Record::SIZE]; SECTORS],
}

impl<const SECTORS: usize> Default for MemoryFlash<SECTORS> {
    fn default() -> Self {
        Self {
            sectors: [[0xFF; Record::SIZE]; SECTORS],
        }
    }
}

impl<const SECTORS: usize> MemoryFlash<SECTORS> {
    pub fn sector_mut(&mut self, sector: usize) -> Option<&mut [u8; Record::SIZE]> {
        self.sectors.get_mut(sector)
    }
}

impl<const SECTORS: usize> Flash for MemoryFlash<SECTORS> {
    fn sectors(&self) -> usize {
        SECTORS
    }

    fn read(&mut self, sector: usize, buffer: &mut [u8; Record::SIZE]) -> Result<(), Error> {
        let data = self.sectors.get(sector).ok_or(Error::Flash)?;
        buffer.copy_from_slice(data);
        Ok(())
    }

    fn write(&mut self, sector: usize, data: &[u8; Record::SIZE]) -> Result<(), Error> {
        let target = self.sectors.get_mut(sector).ok_or(Error::Flash)?;
        target.copy_from_slice(data);
        Ok(())
    }
}
