/// Measurement boundary. The platform implementation owns the conversion
/// sequence and any averaging or debouncing; the core only sees the reduced
/// 8-bit value. The read may busy-wait on the hardware, but only for a
/// bounded conversion time.
pub trait ProcessSensor {
    fn read(&mut self) -> u8;
}
