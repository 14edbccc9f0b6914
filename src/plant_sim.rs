//! First-order plant simulation for host runs: the commanded duty pulls the
//! process level toward itself a little on every read, so steady state needs
//! a drive equal to the level. Sensor and drive handles share the plant
//! through a cell, the same split a real board gets from ADC and PWM.

use std::cell::RefCell;
use std::rc::Rc;

use crate::actuator::PwmActuator;
use crate::process_sensor::ProcessSensor;

/// Fraction of the drive/level gap closed per sensor read.
const RESPONSE: f32 = 0.05;

struct PlantState {
    level: f32,
    drive: u8,
}

pub struct SimulatedPlant {
    inner: Rc<RefCell<PlantState>>,
}

impl SimulatedPlant {
    pub fn new(initial_level: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PlantState {
                level: initial_level,
                drive: 0,
            })),
        }
    }

    pub fn split(&self) -> (PlantSensor, PlantDrive) {
        (
            PlantSensor {
                inner: Rc::clone(&self.inner),
            },
            PlantDrive {
                inner: Rc::clone(&self.inner),
            },
        )
    }

    pub fn level(&self) -> f32 {
        self.inner.borrow().level
    }
}

pub struct PlantSensor {
    inner: Rc<RefCell<PlantState>>,
}

impl ProcessSensor for PlantSensor {
    /// Advances the plant one lap, then reports the level as the averaged
    /// 8-bit reading a real converter would hand back.
    fn read(&mut self) -> u8 {
        let mut state = self.inner.borrow_mut();
        let target = f32::from(state.drive);
        state.level += (target - state.level) * RESPONSE;
        state.level.clamp(0.0, 255.0).round() as u8
    }
}

pub struct PlantDrive {
    inner: Rc<RefCell<PlantState>>,
}

impl PwmActuator for PlantDrive {
    fn set_duty(&mut self, duty: u8) {
        self.inner.borrow_mut().drive = duty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_follows_the_drive() {
        let plant = SimulatedPlant::new(0.0);
        let (mut sensor, mut drive) = plant.split();

        drive.set_duty(200);
        let mut reading = 0;
        for _ in 0..400 {
            reading = sensor.read();
        }
        assert!(reading >= 195, "plant should settle near the drive, got {reading}");

        drive.set_duty(0);
        for _ in 0..400 {
            reading = sensor.read();
        }
        assert!(reading <= 5, "plant should decay with the drive, got {reading}");
    }
}
