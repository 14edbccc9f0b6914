//! Parameter persistence: setpoint, mode and the three gains survive a power
//! cycle through a byte-addressable non-volatile store. Fields are written
//! one at a time; there is no multi-field transaction, and a power loss in
//! the middle of a save leaves a partially updated block. Loads are taken
//! at face value: an erased store reads back as garbage, and provisioning
//! sane values is a deployment step, not this module's job.

use crate::pid::{Gains, Mode, Pid};

/// Byte-addressable persistent storage collaborator. No wear-leveling and no
/// transactional guarantee is assumed.
pub trait NvStorage {
    fn read_u8(&mut self, addr: u16) -> u8;
    fn write_u8(&mut self, addr: u16, value: u8);
    fn read_u16(&mut self, addr: u16) -> u16;
    fn write_u16(&mut self, addr: u16, value: u16);
}

impl<T: NvStorage + ?Sized> NvStorage for &mut T {
    fn read_u8(&mut self, addr: u16) -> u8 {
        (**self).read_u8(addr)
    }
    fn write_u8(&mut self, addr: u16, value: u8) {
        (**self).write_u8(addr, value)
    }
    fn read_u16(&mut self, addr: u16) -> u16 {
        (**self).read_u16(addr)
    }
    fn write_u16(&mut self, addr: u16, value: u16) {
        (**self).write_u16(addr, value)
    }
}

/// Fixed logical layout of the parameter block.
mod addr {
    pub const SETPOINT: u16 = 0x00;
    pub const MODE: u16 = 0x01;
    pub const GAIN_P: u16 = 0x02;
    pub const GAIN_I: u16 = 0x04;
    pub const GAIN_D: u16 = 0x06;
}

/// Total bytes occupied by the parameter block.
pub const PARAM_BLOCK_LEN: usize = 8;

pub struct ParamStore<S: NvStorage> {
    storage: S,
}

impl<S: NvStorage> ParamStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Write the five persisted fields, each independently.
    pub fn save(&mut self, pid: &Pid) {
        let gains = pid.gains();
        self.storage.write_u16(addr::GAIN_P, gains.p);
        self.storage.write_u16(addr::GAIN_I, gains.i);
        self.storage.write_u16(addr::GAIN_D, gains.d);
        self.storage.write_u8(addr::SETPOINT, pid.setpoint());
        self.storage.write_u8(addr::MODE, encode_mode(pid.mode()));
    }

    /// Read the five persisted fields back and overwrite the controller's
    /// in-memory values unconditionally. No range validation.
    pub fn load(&mut self, pid: &mut Pid) {
        let gains = Gains {
            p: self.storage.read_u16(addr::GAIN_P),
            i: self.storage.read_u16(addr::GAIN_I),
            d: self.storage.read_u16(addr::GAIN_D),
        };
        let mode = decode_mode(self.storage.read_u8(addr::MODE));
        let setpoint = self.storage.read_u8(addr::SETPOINT);
        pid.restore(setpoint, mode, gains);
    }
}

fn encode_mode(mode: Mode) -> u8 {
    match mode {
        Mode::Manual => 0,
        Mode::Auto => 1,
    }
}

// Any nonzero byte reads back as Auto; the store is trusted as-is.
fn decode_mode(value: u8) -> Mode {
    match value {
        0 => Mode::Manual,
        _ => Mode::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ArrayStorage {
        bytes: [u8; PARAM_BLOCK_LEN],
    }

    impl ArrayStorage {
        fn erased() -> Self {
            Self {
                bytes: [0xFF; PARAM_BLOCK_LEN],
            }
        }
    }

    impl NvStorage for ArrayStorage {
        fn read_u8(&mut self, addr: u16) -> u8 {
            self.bytes[addr as usize]
        }
        fn write_u8(&mut self, addr: u16, value: u8) {
            self.bytes[addr as usize] = value;
        }
        fn read_u16(&mut self, addr: u16) -> u16 {
            let a = addr as usize;
            u16::from_le_bytes([self.bytes[a], self.bytes[a + 1]])
        }
        fn write_u16(&mut self, addr: u16, value: u16) {
            let a = addr as usize;
            self.bytes[a..a + 2].copy_from_slice(&value.to_le_bytes());
        }
    }

    #[test]
    fn save_load_round_trip() {
        let mut store = ParamStore::new(ArrayStorage::erased());

        let mut pid = Pid::new().with_gains(Gains { p: 17, i: 3, d: 900 });
        pid.set_setpoint(100);
        pid.set_mode(Mode::Auto);
        store.save(&pid);

        let mut restored = Pid::new();
        store.load(&mut restored);
        assert_eq!(restored.setpoint(), 100);
        assert_eq!(restored.mode(), Mode::Auto);
        assert_eq!(restored.gains(), Gains { p: 17, i: 3, d: 900 });
    }

    #[test]
    fn load_does_not_touch_runtime_state() {
        let mut store = ParamStore::new(ArrayStorage::erased());
        let pid = Pid::new();
        store.save(&pid);

        let mut running = Pid::new().with_gains(Gains { p: 1, i: 1, d: 0 });
        running.set_setpoint(50);
        running.observe(10);
        running.observe(20);
        running.control(&mut crate::pid::NoRecorder);
        let error_sum = running.error_sum();

        store.load(&mut running);
        // Persistence restores parameters, not accumulators or measurements.
        assert_eq!(running.error_sum(), error_sum);
        assert_eq!(running.process_value(), 20);
        assert_eq!(running.last_process_value(), 10);
    }

    #[test]
    fn erased_store_loads_unvalidated_garbage() {
        let mut store = ParamStore::new(ArrayStorage::erased());
        let mut pid = Pid::new();
        store.load(&mut pid);
        // Accepted first-boot exposure: all-bits-set parameters.
        assert_eq!(pid.setpoint(), 0xFF);
        assert_eq!(pid.mode(), Mode::Auto);
        assert_eq!(
            pid.gains(),
            Gains {
                p: 0xFFFF,
                i: 0xFFFF,
                d: 0xFFFF
            }
        );
    }

    #[test]
    fn manual_mode_round_trips_as_zero_byte() {
        let mut storage = ArrayStorage::erased();
        {
            let mut store = ParamStore::new(&mut storage);
            store.save(&Pid::new());
        }
        assert_eq!(storage.bytes[0x01], 0);

        let mut pid = Pid::new();
        pid.set_mode(Mode::Auto);
        ParamStore::new(&mut storage).load(&mut pid);
        assert_eq!(pid.mode(), Mode::Manual);
    }
}
