#![cfg_attr(not(test), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod actuator;
pub mod nv_store;
pub mod output;
pub mod pid;
pub mod process_sensor;
pub mod regulator;
pub mod sample_clock;

#[cfg(feature = "std")]
pub mod nv_store_sim;
#[cfg(feature = "std")]
pub mod plant_sim;

#[cfg(feature = "defmt")]
pub use defmt as log;

#[cfg(not(feature = "defmt"))]
pub use log;

pub static VERSION: &str = "v0.1";

/// Main control-loop lap time. The sample interval is a multiple of this,
/// so a due sample is picked up within one lap of the tick that raised it.
pub static LOOP_TICK_MILLIS: u32 = 2;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::watch::Watch;
use serde::{Deserialize, Serialize};

use crate::pid::{Gains, Mode};

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    SetMode(Mode),
    SetSetpoint(u8),
    SetGains(Gains),
    /// Direct actuator command, meaningful in manual mode.
    SetOutput(u8),
    SaveParameters,
    LoadParameters,
}

pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, 4> = Channel::new();
pub static REGULATOR_STATE: Watch<CriticalSectionRawMutex, RegulatorState, 2> = Watch::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatorState {
    pub mode: Mode,
    pub setpoint: u8,
    pub process_value: u8,
    pub error_sum: i32,
    pub output: u8,
    pub gains: Gains,
}
