//! The 4 KiB address space of the machine.
//!
//! ```text
//! 0x000 +---------------------------+
//!       | hex digit font (80 bytes) |
//! 0x050 +---------------------------+
//!       | reserved                  |
//! 0x200 +---------------------------+
//!       | program image             |
//! 0xFFF +---------------------------+
//! ```

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address range {address:X}+{len} lies outside of memory")]
pub struct AddressOutOfRangeError {
    pub address: usize,
    pub len: usize,
}

impl AddressOutOfRangeError {
    /// The first address of the requested range that doesn't exist.
    pub fn first_invalid_address(&self) -> usize {
        self.address.max(Memory::LEN)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Memory([u8; Self::LEN]);

impl Memory {
    /// Number of addressable bytes.
    pub const LEN: usize = 0x1000;
    /// Highest valid address.
    pub const MAX_ADDRESS: u16 = (Self::LEN - 1) as u16;
    /// Where program images are loaded and execution starts.
    pub const PROGRAM_START: u16 = 0x200;
    /// Largest program image that fits behind [`Self::PROGRAM_START`].
    pub const MAX_PROGRAM_LEN: usize = Self::LEN - Self::PROGRAM_START as usize;

    pub fn read(&self, address: usize) -> Result<u8, AddressOutOfRangeError> {
        self.0
            .get(address)
            .copied()
            .ok_or(AddressOutOfRangeError { address, len: 1 })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), AddressOutOfRangeError> {
        let cell = self
            .0
            .get_mut(address)
            .ok_or(AddressOutOfRangeError { address, len: 1 })?;
        *cell = value;
        Ok(())
    }

    /// `len` bytes starting at `address`.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8], AddressOutOfRangeError> {
        address
            .checked_add(len)
            .and_then(|end| self.0.get(address..end))
            .ok_or(AddressOutOfRangeError { address, len })
    }

    pub fn slice_mut(
        &mut self,
        address: usize,
        len: usize,
    ) -> Result<&mut [u8], AddressOutOfRangeError> {
        address
            .checked_add(len)
            .and_then(move |end| self.0.get_mut(address..end))
            .ok_or(AddressOutOfRangeError { address, len })
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self([0; Self::LEN])
    }
}

impl From<[u8; Memory::LEN]> for Memory {
    fn from(bytes: [u8; Memory::LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Memory {
    /// Hex dump of all rows that aren't entirely zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory(")?;
        for (row, bytes) in self.0.chunks(16).enumerate() {
            if bytes.iter().all(|&byte| byte == 0) {
                continue;
            }
            write!(f, "{:03X}:", row * 16)?;
            for byte in bytes {
                write!(f, " {byte:02X}")?;
            }
            writeln!(f)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn last_cell_is_addressable() {
        let mut memory = Memory::default();
        memory.write(0xFFF, 0x2A).unwrap();
        assert_eq!(memory.read(0xFFF), Ok(0x2A));
        assert_eq!(
            memory.read(0x1000),
            Err(AddressOutOfRangeError {
                address: 0x1000,
                len: 1
            })
        );
        assert!(memory.write(0x1000, 0).is_err());
    }

    #[test]
    fn slice_bounds() {
        let memory = Memory::default();
        assert_eq!(memory.slice(0xFFD, 3).map(<[u8]>::len), Ok(3));

        let err = memory.slice(0xFFE, 3).unwrap_err();
        assert_eq!(err.first_invalid_address(), 0x1000);
        assert!(memory.slice(usize::MAX, 2).is_err());
    }
}
