/// Duty-cycle actuator boundary. The platform implementation commits the
/// value to its PWM compare register; anything in `0..=255` must be accepted.
pub trait PwmActuator {
    fn set_duty(&mut self, duty: u8);
}
