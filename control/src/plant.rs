//! Actuators and sensors of the line, driven by menu commands.

use crate::input::snapshot::Millis;
use crate::layout;
use crate::log;
use crate::menu::command::{Command, Effect, Executor, Indicator, Indicators};
use crate::save::{Backend, SettingsStore};
use crate::settings::Settings;

/// Relay channels, in the order they are wired on the expanders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Relay {
    Heater,
    Valve,
    ShredderPower,
    Mixer,
    Pump,
    Screw,
    Conveyor,
    ShredderTrigger,
    LinearDoor,
    Vacuum,
    Blower,
    MouldA,
    VacuumAB,
    BlowerAB,
    MouldB,
    ForwardReverse,
    UpDown,
}

impl Relay {
    pub const COUNT: usize = 17;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Heater,
        Self::Valve,
        Self::ShredderPower,
        Self::Mixer,
        Self::Pump,
        Self::Screw,
        Self::Conveyor,
        Self::ShredderTrigger,
        Self::LinearDoor,
        Self::Vacuum,
        Self::Blower,
        Self::MouldA,
        Self::VacuumAB,
        Self::BlowerAB,
        Self::MouldB,
        Self::ForwardReverse,
        Self::UpDown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Drivers of the physical outputs and inputs.
pub trait Hardware {
    fn set_relay(&mut self, relay: Relay, on: bool);

    /// Raw load cell reading, `None` when the cell does not respond.
    fn read_load_cell(&mut self) -> Option<i32>;
}

/// Message to be shown instead of the menu for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub message: &'static str,
    pub duration: Millis,
}

impl Status {
    const fn new(message: &'static str, duration: Millis) -> Self {
        Self { message, duration }
    }
}

/// Run state of the line and the last known state of every relay.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plant<H> {
    hardware: H,
    relays: [bool; Relay::COUNT],
    running: bool,
    test_mode: bool,
    status: Option<Status>,
}

impl<H: Hardware> Plant<H> {
    /// Take over the hardware, switching all relays off.
    pub fn new(hardware: H) -> Self {
        let mut plant = Self {
            hardware,
            relays: [false; Relay::COUNT],
            running: false,
            test_mode: false,
            status: None,
        };
        plant.all_off();
        plant
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn relay(&self, relay: Relay) -> bool {
        self.relays[relay.index()]
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Hand over the status message set by the last command, if any.
    pub fn take_status(&mut self) -> Option<Status> {
        self.status.take()
    }

    pub fn set_relay(&mut self, relay: Relay, on: bool) {
        self.relays[relay.index()] = on;
        self.hardware.set_relay(relay, on);
    }

    pub fn all_off(&mut self) {
        for relay in Relay::ALL {
            self.set_relay(relay, false);
        }
    }

    fn tare<B: Backend>(&mut self, settings: &mut Settings, store: &mut SettingsStore<B>) -> Status {
        if let Some(raw) = self.hardware.read_load_cell() {
            settings.calibration = settings.calibration.tared(raw);
            settings.calibration.save(store);
            log::info!("Scale tared at raw={}", raw);
            Status::new("Tare Done", 1000)
        } else {
            log::warning!("Load cell does not respond");
            Status::new("Scale Error", 1000)
        }
    }

    fn calibrate<B: Backend>(
        &mut self,
        settings: &mut Settings,
        store: &mut SettingsStore<B>,
    ) -> Status {
        let known = settings.scale_calibration_weight as f32;
        let result = self
            .hardware
            .read_load_cell()
            .map(|raw| settings.calibration.with_known_weight(raw, known));
        match result {
            Some(Ok(calibration)) => {
                settings.calibration = calibration;
                calibration.save(store);
                log::info!("Scale calibrated, factor={}", calibration.factor);
                Status::new("Calibrated", 2000)
            }
            Some(Err(_err)) => {
                log::warning!("Calibration failed: {:?}", _err);
                Status::new("Cal Failed", 2000)
            }
            None => {
                log::warning!("Load cell does not respond");
                Status::new("Cal Failed", 2000)
            }
        }
    }
}

impl<H: Hardware> Executor for Plant<H> {
    fn execute<B: Backend>(
        &mut self,
        command: Command,
        settings: &mut Settings,
        store: &mut SettingsStore<B>,
    ) -> Effect {
        let (status, effect) = match command {
            Command::StartAutoRun => {
                self.running = true;
                log::info!("Starting auto run");
                (
                    Some(Status::new("Starting Auto Run", 2000)),
                    Effect::Enter(layout::RUNNING),
                )
            }
            Command::StopAutoRun => {
                self.running = false;
                self.all_off();
                log::info!("Auto run stopped");
                (Some(Status::new("Stopped", 1000)), Effect::Reset)
            }
            Command::EnterTestMode => {
                self.test_mode = true;
                log::info!("Entering test mode");
                (
                    Some(Status::new("Test Mode", 1000)),
                    Effect::Enter(layout::TEST),
                )
            }
            Command::ExitTestMode => {
                self.test_mode = false;
                self.all_off();
                log::info!("Exiting test mode");
                (Some(Status::new("Test Exit", 1000)), Effect::Back)
            }
            Command::ToggleRelay(relay) => {
                let on = !self.relay(relay);
                self.set_relay(relay, on);
                log::debug!("Relay {:?} set to {}", relay, on);
                (None, Effect::None)
            }
            Command::SaveAll => (Some(Status::new("Settings Saved!", 2000)), Effect::SaveAll),
            Command::RestoreDefaults => (
                Some(Status::new("Reset Defaults", 2000)),
                Effect::RestoreDefaults,
            ),
            Command::Tare => (Some(self.tare(settings, store)), Effect::None),
            Command::CalibrateScale => (Some(self.calibrate(settings, store)), Effect::None),
        };
        if status.is_some() {
            self.status = status;
        }
        effect
    }
}

impl<H> Indicators for Plant<H> {
    fn is_active(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Relay(relay) => self.relays[relay.index()],
        }
    }
}
