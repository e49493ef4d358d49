use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use static_assertions::const_assert_eq;

use crate::nibble_ints::U4;

/// General purpose register of the CHIP-8 machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum DataRegister {
    /// Also the offset of the indexed jump `Bnnn`.
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    /// Flag register. Receives the carry, borrow, shifted-out bit or sprite collision
    /// of every instruction that defines a flag.
    VF,
}

impl DataRegister {
    pub const COUNT: usize = 16;

    /// All registers in index order.
    pub const ALL: [DataRegister; Self::COUNT] = [
        Self::V0,
        Self::V1,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::VA,
        Self::VB,
        Self::VC,
        Self::VD,
        Self::VE,
        Self::VF,
    ];

    pub const fn index(self) -> usize {
        self as u8 as usize
    }
}

const_assert_eq!(DataRegister::COUNT, U4::MAX.into_u8() as usize + 1);

impl From<DataRegister> for U4 {
    fn from(register: DataRegister) -> Self {
        U4::from_masked(register as u8)
    }
}

impl From<U4> for DataRegister {
    fn from(val: U4) -> Self {
        Self::ALL[val.into_u8() as usize]
    }
}

impl fmt::Display for DataRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", *self as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nibble_conversion() {
        for register in DataRegister::ALL {
            assert_eq!(DataRegister::from(U4::from(register)), register);
        }
        assert_eq!(DataRegister::try_from(0xA_u8).ok(), Some(DataRegister::VA));
        assert!(DataRegister::try_from(0x10_u8).is_err());
        assert_eq!(DataRegister::VC.to_string(), "VC");
    }
}
