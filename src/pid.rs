//! Discrete-time PID controller with integer fixed-point gains.
//!
//! - Works on 8-bit process values and setpoints
//! - Gains are unsigned 16-bit, scaled down by an integer divisor
//! - Integral anti-windup via accumulator clamping
//! - Derivative-on-measurement (ref.: AVR221), so a setpoint step does not
//!   kick the D term
//! - All intermediate products are carried in `i64`, which makes overflow
//!   impossible for any reachable operand combination
//!
//! The control law itself is pure: for identical state it always yields the
//! same output.

use serde::{Deserialize, Serialize};

/// Clamp bound for the integral accumulator.
pub const MAX_ERROR_SUM: i32 = 10_000;

/// Default divisor applied to the summed P/I/D terms.
pub const SCALING_FACTOR: u16 = 128;

/// Lowest value the output stage will command.
pub const MIN_OUTPUT: u8 = 0;

/// Highest value the output stage will command.
pub const MAX_OUTPUT: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gains {
    pub p: u16,
    pub i: u16,
    pub d: u16,
}

/// Snapshot of one control-law evaluation, before output saturation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Terms {
    pub e: i16,
    pub p: i64,
    pub i: i64,
    pub d: i64,
    pub u: i64,
}

/// Observability hook for the control law. Injected rather than compiled in,
/// so tests and diagnostics can watch intermediate terms without a rebuild.
pub trait TermRecorder {
    fn record(&mut self, terms: &Terms);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecorder;

impl TermRecorder for NoRecorder {
    fn record(&mut self, _terms: &Terms) {}
}

/// Keeps the most recent control-law snapshots in a fixed-capacity ring.
#[derive(Default)]
pub struct HistoryRecorder<const N: usize> {
    buf: heapless::HistoryBuffer<Terms, N>,
}

impl<const N: usize> HistoryRecorder<N> {
    pub fn new() -> Self {
        Self {
            buf: heapless::HistoryBuffer::new(),
        }
    }

    /// The most recent snapshot, if any cycle has run.
    pub fn last(&self) -> Option<&Terms> {
        self.buf.recent()
    }

    /// Snapshots oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Terms> {
        self.buf.oldest_ordered()
    }
}

impl<const N: usize> TermRecorder for HistoryRecorder<N> {
    fn record(&mut self, terms: &Terms) {
        self.buf.write(*terms);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pid {
    setpoint: u8,
    process_value: u8,
    last_process_value: u8,
    error_sum: i32,
    mode: Mode,
    gains: Gains,
    scaling: u16,
}

impl Pid {
    /// All-zero state, manual mode, default scaling divisor.
    pub fn new() -> Self {
        Self {
            setpoint: 0,
            process_value: 0,
            last_process_value: 0,
            error_sum: 0,
            mode: Mode::Manual,
            gains: Gains::default(),
            scaling: SCALING_FACTOR,
        }
    }

    /// Builder: set the three gains.
    pub fn with_gains(mut self, gains: Gains) -> Self {
        self.gains = gains;
        self
    }

    /// Builder: override the scaling divisor.
    ///
    /// Panics if `scaling` is zero.
    pub fn with_scaling(mut self, scaling: u16) -> Self {
        assert!(scaling != 0);
        self.scaling = scaling;
        self
    }

    /// Switch operating mode. Always resets accumulated state first so the
    /// new mode starts without integral history or a stale derivative
    /// reference.
    pub fn set_mode(&mut self, mode: Mode) {
        self.reset();
        self.mode = mode;
    }

    /// Clear the integral accumulator and both measurement slots. Idempotent.
    pub fn reset(&mut self) {
        self.error_sum = 0;
        self.last_process_value = 0;
        self.process_value = 0;
    }

    /// Feed one measurement. Runs every loop lap, not just on due samples,
    /// so the derivative reference stays one cycle behind the latest value.
    pub fn observe(&mut self, process_value: u8) {
        self.last_process_value = self.process_value;
        self.process_value = process_value;
    }

    /// Evaluate the control law once and return the unsaturated output.
    ///
    /// Wide signed multiplication is fully defined for `i64`, so the terms
    /// are computed directly instead of the sign-magnitude split some 8-bit
    /// targets need for the same math.
    pub fn control(&mut self, recorder: &mut impl TermRecorder) -> i64 {
        let e = i16::from(self.setpoint) - i16::from(self.process_value);

        self.error_sum =
            (self.error_sum + i32::from(e)).clamp(-MAX_ERROR_SUM, MAX_ERROR_SUM);

        let p = i64::from(self.gains.p) * i64::from(e);
        let i = i64::from(self.gains.i) * i64::from(self.error_sum);

        let delta_pv =
            i16::from(self.process_value) - i16::from(self.last_process_value);
        let d = i64::from(self.gains.d) * i64::from(delta_pv);

        let u = (p + i + d) / i64::from(self.scaling);

        recorder.record(&Terms { e, p, i, d, u });
        u
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn setpoint(&self) -> u8 {
        self.setpoint
    }

    pub fn set_setpoint(&mut self, setpoint: u8) {
        self.setpoint = setpoint;
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    pub fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
    }

    pub fn process_value(&self) -> u8 {
        self.process_value
    }

    pub fn last_process_value(&self) -> u8 {
        self.last_process_value
    }

    pub fn error_sum(&self) -> i32 {
        self.error_sum
    }

    /// Persistence path: overwrite the stored fields exactly as read back,
    /// without the reset that `set_mode` performs and without validation.
    pub fn restore(&mut self, setpoint: u8, mode: Mode, gains: Gains) {
        self.setpoint = setpoint;
        self.mode = mode;
        self.gains = gains;
    }
}

impl Default for Pid {
    fn default() -> Self {
        Self::new()
    }
}
