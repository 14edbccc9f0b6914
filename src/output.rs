//! Output stage: saturates control values into the actuator's range and
//! remembers the last commanded duty. Saturation is the normal way the
//! controller rides its limits, never a fault.

use crate::actuator::PwmActuator;
use crate::pid::{MAX_OUTPUT, MIN_OUTPUT};

pub struct OutputStage<A: PwmActuator> {
    actuator: A,
    last: u8,
}

impl<A: PwmActuator> OutputStage<A> {
    pub fn new(actuator: A) -> Self {
        Self { actuator, last: 0 }
    }

    /// Clamp `u` into `[MIN_OUTPUT, MAX_OUTPUT]`, forward it to the actuator
    /// and return the commanded value.
    pub fn set(&mut self, u: i64) -> u8 {
        let duty = if u > i64::from(MAX_OUTPUT) {
            MAX_OUTPUT
        } else if u < i64::from(MIN_OUTPUT) {
            MIN_OUTPUT
        } else {
            u as u8
        };
        self.last = duty;
        self.actuator.set_duty(duty);
        duty
    }

    /// Last commanded value, without touching the actuator.
    pub fn get(&self) -> u8 {
        self.last
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
