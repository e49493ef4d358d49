use derive_more::{AsRef, Display, Into, UpperHex};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("value {value} exceeds the maximum value {max_value}")]
pub struct UpperBoundExceededError {
    value: usize,
    max_value: usize,
}

/// A 4-bit operand, e.g. a register selector or a sprite height.
/// Stored in a full byte, only the low nibble is ever set.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    AsRef,
    Into,
    Display,
    UpperHex,
)]
#[repr(transparent)]
pub struct U4(u8);

impl U4 {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(0b1111);

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    /// Keep only the low nibble of `val`.
    pub const fn from_masked(val: u8) -> Self {
        Self(val & 0b1111)
    }
}

impl TryFrom<u8> for U4 {
    type Error = UpperBoundExceededError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= U4::MAX.0 {
            Ok(U4(value))
        } else {
            Err(UpperBoundExceededError {
                value: value as usize,
                max_value: U4::MAX.0 as usize,
            })
        }
    }
}

/// A 12-bit address operand as found in the `nnn` field of an opcode.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    AsRef,
    Into,
    Display,
    UpperHex,
)]
#[repr(transparent)]
pub struct U12(u16);

impl U12 {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(0b1111_1111_1111);

    pub const fn into_u16(self) -> u16 {
        self.0
    }

    /// Keep only the low 12 bits of `val`.
    pub const fn from_masked(val: u16) -> Self {
        Self(val & 0b1111_1111_1111)
    }
}

impl TryFrom<u16> for U12 {
    type Error = UpperBoundExceededError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= U12::MAX.0 {
            Ok(U12(value))
        } else {
            Err(UpperBoundExceededError {
                value: value as usize,
                max_value: U12::MAX.0 as usize,
            })
        }
    }
}
