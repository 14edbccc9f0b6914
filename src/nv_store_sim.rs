//! RAM-backed parameter storage for host runs. Starts in the erased state a
//! real EEPROM ships in, all bits set.

use crate::nv_store::NvStorage;

pub struct RamStorage {
    bytes: [u8; 32],
}

impl RamStorage {
    pub fn new() -> Self {
        Self { bytes: [0xFF; 32] }
    }
}

impl Default for RamStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NvStorage for RamStorage {
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
