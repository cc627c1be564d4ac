//! Runtime configuration of the line, edited through the menu.
//!
//! The menu never holds references into this struct. Instead, each editable
//! item carries a small handle naming the field it controls. The engine then
//! resolves the handle against the one `Settings` instance it owns.

use crate::scale::Calibration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntSetting {
    WaterAmount,
    WaterFlowTimeout,
    StarchWeight,
    StarchDispenseTime,
    ShredderTime,
    MixTime,
    MixSpeed,
    PumpTime,
    ConveyorSpeed,
    MouldSuctionTime,
    MouldBlowerTime,
    MouldCycleDelay,
    DryingTime,
    DryingTemp,
    ScaleCalibrationWeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FloatSetting {
    FlowPerPulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoolSetting {
    StarchByWeight,
}

/// All tunable parameters of the line.
///
/// Times are in seconds, amounts in milliliters, weights in grams, speeds in
/// percent and temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub water_amount: i32,
    pub water_flow_timeout: i32,
    pub flow_per_pulse: f32,
    pub starch_weight: i32,
    pub starch_dispense_time: i32,
    pub starch_by_weight: bool,
    pub shredder_time: i32,
    pub mix_time: i32,
    pub mix_speed: i32,
    pub pump_time: i32,
    pub conveyor_speed: i32,
    pub mould_suction_time: i32,
    pub mould_blower_time: i32,
    pub mould_cycle_delay: i32,
    pub drying_time: i32,
    pub drying_temp: i32,
    pub scale_calibration_weight: i32,
    pub calibration: Calibration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            water_amount: 1000,
            water_flow_timeout: 60,
            flow_per_pulse: 2.2,
            starch_weight: 500,
            starch_dispense_time: 10,
            starch_by_weight: true,
            shredder_time: 30,
            mix_time: 120,
            mix_speed: 100,
            pump_time: 45,
            conveyor_speed: 50,
            mould_suction_time: 8,
            mould_blower_time: 5,
            mould_cycle_delay: 2,
            drying_time: 300,
            drying_temp: 80,
            scale_calibration_weight: 500,
            calibration: Calibration::default(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn int(&self, setting: IntSetting) -> i32 {
        match setting {
            IntSetting::WaterAmount => self.water_amount,
            IntSetting::WaterFlowTimeout => self.water_flow_timeout,
            IntSetting::StarchWeight => self.starch_weight,
            IntSetting::StarchDispenseTime => self.starch_dispense_time,
            IntSetting::ShredderTime => self.shredder_time,
            IntSetting::MixTime => self.mix_time,
            IntSetting::MixSpeed => self.mix_speed,
            IntSetting::PumpTime => self.pump_time,
            IntSetting::ConveyorSpeed => self.conveyor_speed,
            IntSetting::MouldSuctionTime => self.mould_suction_time,
            IntSetting::MouldBlowerTime => self.mould_blower_time,
            IntSetting::MouldCycleDelay => self.mould_cycle_delay,
            IntSetting::DryingTime => self.drying_time,
            IntSetting::DryingTemp => self.drying_temp,
            IntSetting::ScaleCalibrationWeight => self.scale_calibration_weight,
        }
    }

    pub fn set_int(&mut self, setting: IntSetting, value: i32) {
        let field = match setting {
            IntSetting::WaterAmount => &mut self.water_amount,
            IntSetting::WaterFlowTimeout => &mut self.water_flow_timeout,
            IntSetting::StarchWeight => &mut self.starch_weight,
            IntSetting::StarchDispenseTime => &mut self.starch_dispense_time,
            IntSetting::ShredderTime => &mut self.shredder_time,
            IntSetting::MixTime => &mut self.mix_time,
            IntSetting::MixSpeed => &mut self.mix_speed,
            IntSetting::PumpTime => &mut self.pump_time,
            IntSetting::ConveyorSpeed => &mut self.conveyor_speed,
            IntSetting::MouldSuctionTime => &mut self.mould_suction_time,
            IntSetting::MouldBlowerTime => &mut self.mould_blower_time,
            IntSetting::MouldCycleDelay => &mut self.mould_cycle_delay,
            IntSetting::DryingTime => &mut self.drying_time,
            IntSetting::DryingTemp => &mut self.drying_temp,
            IntSetting::ScaleCalibrationWeight => &mut self.scale_calibration_weight,
        };
        *field = value;
    }

    #[must_use]
    pub fn float(&self, setting: FloatSetting) -> f32 {
        match setting {
            FloatSetting::FlowPerPulse => self.flow_per_pulse,
        }
    }

    pub fn set_float(&mut self, setting: FloatSetting, value: f32) {
        match setting {
            FloatSetting::FlowPerPulse => self.flow_per_pulse = value,
        }
    }

    #[must_use]
    pub fn flag(&self, setting: BoolSetting) -> bool {
        match setting {
            BoolSetting::StarchByWeight => self.starch_by_weight,
        }
    }

    pub fn set_flag(&mut self, setting: BoolSetting, value: bool) {
        match setting {
            BoolSetting::StarchByWeight => self.starch_by_weight = value,
        }
    }
}
