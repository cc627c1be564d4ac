//! Convert raw load cell readings into grams.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::log;
use crate::save::{Backend, SettingsStore};

pub const ZERO_KEY: &str = "scaleZero";
pub const FACTOR_KEY: &str = "scaleFactor";
pub const CALIBRATED_KEY: &str = "scaleCal";

// Anything beyond this is a corrupted save rather than a real load cell
const MAX_FACTOR: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    InvalidWeight,
    NoLoad,
}

/// Linear mapping from raw readings to weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub zero_offset: f32,
    pub factor: f32,
    pub calibrated: bool,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            zero_offset: 0.0,
            factor: 1.0,
            calibrated: false,
        }
    }
}

impl Calibration {
    /// Recover calibration from the store, falling back to defaults when
    /// the stored numbers cannot describe a load cell.
    pub fn load<B: Backend>(store: &SettingsStore<B>) -> Self {
        let defaults = Self::default();
        let calibration = Self {
            zero_offset: store.load(ZERO_KEY, defaults.zero_offset),
            factor: store.load(FACTOR_KEY, defaults.factor),
            calibrated: store.load(CALIBRATED_KEY, defaults.calibrated),
        };
        if calibration.is_valid() {
            calibration
        } else {
            log::warning!("Invalid calibration data, using defaults");
            defaults
        }
    }

    pub fn save<B: Backend>(&self, store: &mut SettingsStore<B>) {
        store.save(ZERO_KEY, self.zero_offset);
        store.save(FACTOR_KEY, self.factor);
        store.save(CALIBRATED_KEY, self.calibrated);
    }

    pub fn is_valid(&self) -> bool {
        self.zero_offset.is_finite()
            && self.factor.is_finite()
            && self.factor != 0.0
            && self.factor.abs() <= MAX_FACTOR
    }

    /// Take the given reading as the empty scale.
    #[must_use]
    pub fn tared(self, raw: i32) -> Self {
        Self {
            zero_offset: raw as f32,
            ..self
        }
    }

    /// Derive the factor from a reading taken with a known weight placed on
    /// the tared scale.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidWeight` when the known weight is not positive and
    /// with `NoLoad` when the reading does not differ from the zero offset.
    pub fn with_known_weight(self, raw: i32, known: f32) -> Result<Self, CalibrationError> {
        if !known.is_finite() || known <= 0.0 {
            return Err(CalibrationError::InvalidWeight);
        }

        let difference = raw as f32 - self.zero_offset;
        if difference == 0.0 {
            return Err(CalibrationError::NoLoad);
        }

        let calibrated = Self {
            factor: difference / known,
            calibrated: true,
            ..self
        };
        if calibrated.is_valid() {
            Ok(calibrated)
        } else {
            Err(CalibrationError::NoLoad)
        }
    }

    /// Weight in grams, zero while uncalibrated.
    pub fn weight(&self, raw: i32) -> f32 {
        if !self.calibrated {
            return 0.0;
        }
        let weight = (raw as f32 - self.zero_offset) / self.factor;
        if weight < 0.0 {
            0.0
        } else {
            weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::memory::MemoryBackend;

    type Store = SettingsStore<MemoryBackend<8>>;

    #[test]
    fn when_nothing_is_stored_it_loads_defaults() {
        let store = Store::default();
        assert_eq!(Calibration::load(&store), Calibration::default());
    }

    #[test]
    fn when_saved_it_loads_back() {
        let mut store = Store::default();
        let calibration = Calibration {
            zero_offset: 8400.0,
            factor: 21.5,
            calibrated: true,
        };
        calibration.save(&mut store);
        assert_eq!(Calibration::load(&store), calibration);
    }

    #[test]
    fn when_stored_factor_is_zero_it_loads_defaults() {
        let mut store = Store::default();
        store.save(ZERO_KEY, 100.0_f32);
        store.save(FACTOR_KEY, 0.0_f32);
        store.save(CALIBRATED_KEY, true);
        assert_eq!(Calibration::load(&store), Calibration::default());
    }

    #[test]
    fn when_stored_factor_is_huge_it_loads_defaults() {
        let mut store = Store::default();
        store.save(FACTOR_KEY, 2_000_000.0_f32);
        store.save(CALIBRATED_KEY, true);
        assert_eq!(Calibration::load(&store), Calibration::default());
    }

    #[test]
    fn when_calibrated_with_known_weight_it_reports_grams() {
        let calibration = Calibration::default()
            .tared(1000)
            .with_known_weight(11_000, 500.0)
            .unwrap();
        assert!(calibration.calibrated);
        assert_relative_eq!(calibration.factor, 20.0);
        assert_relative_eq!(calibration.weight(6000), 250.0);
        assert_relative_eq!(calibration.weight(500), 0.0);
    }

    #[test]
    fn when_known_weight_is_not_positive_it_fails() {
        let calibration = Calibration::default();
        assert_eq!(
            calibration.with_known_weight(100, 0.0),
            Err(CalibrationError::InvalidWeight)
        );
        assert_eq!(
            calibration.with_known_weight(100, -5.0),
            Err(CalibrationError::InvalidWeight)
        );
    }

    #[test]
    fn when_reading_equals_zero_offset_it_fails() {
        let calibration = Calibration::default().tared(250);
        assert_eq!(
            calibration.with_known_weight(250, 500.0),
            Err(CalibrationError::NoLoad)
        );
    }

    #[test]
    fn when_not_calibrated_weight_is_zero() {
        assert_relative_eq!(Calibration::default().weight(12_345), 0.0);
    }
}
