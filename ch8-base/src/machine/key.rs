use num_enum::{IntoPrimitive, TryFromPrimitive};
use static_assertions::const_assert_eq;

use crate::nibble_ints::U4;

/// A key of the hexadecimal keypad.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum Key {
    K0,
    K1,
    K2,
    K3,
    K4,
    K5,
    K6,
    K7,
    K8,
    K9,
    KA,
    KB,
    KC,
    KD,
    KE,
    KF,
}

impl Key {
    pub const COUNT: usize = 16;

    pub const ALL: [Key; Self::COUNT] = [
        Self::K0,
        Self::K1,
        Self::K2,
        Self::K3,
        Self::K4,
        Self::K5,
        Self::K6,
        Self::K7,
        Self::K8,
        Self::K9,
        Self::KA,
        Self::KB,
        Self::KC,
        Self::KD,
        Self::KE,
        Self::KF,
    ];
}

const_assert_eq!(Key::COUNT, U4::MAX.into_u8() as usize + 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    NotPressed,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::NotPressed
    }
}

/// State of all 16 keys.
///
/// Written by the input collaborator between cycles, only read while executing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad([KeyState; Key::COUNT]);

impl Keypad {
    pub fn get(&self, key: Key) -> KeyState {
        self.0[key as u8 as usize]
    }

    pub fn set(&mut self, key: Key, state: KeyState) {
        self.0[key as u8 as usize] = state;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.get(key) == KeyState::Pressed
    }

    /// The lowest-numbered key that is currently pressed.
    pub fn first_pressed(&self) -> Option<Key> {
        Key::ALL.iter().copied().find(|&key| self.is_pressed(key))
    }

    pub fn release_all(&mut self) {
        self.0 = [KeyState::NotPressed; Key::COUNT];
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_pressed_prefers_lowest_key() {
        let mut keypad = Keypad::default();
        assert_eq!(keypad.first_pressed(), None);

        keypad.set(Key::KC, KeyState::Pressed);
        keypad.set(Key::K5, KeyState::Pressed);
        assert_eq!(keypad.first_pressed(), Some(Key::K5));

        keypad.set(Key::K5, KeyState::NotPressed);
        assert_eq!(keypad.first_pressed(), Some(Key::KC));

        keypad.release_all();
        assert_eq!(keypad.first_pressed(), None);
    }
}
