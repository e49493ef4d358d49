//! The built-in hexadecimal digit font.
//!
//! Every glyph is 4 pixels wide and 5 rows tall, stored in the high nibble of 5 consecutive
//! bytes. Glyphs are packed back to back starting at address 0, so the glyph of digit `d`
//! starts at `d * 5`.

use static_assertions::const_assert;

use crate::memory::Memory;

macro_rules! pixel_to_bit {
    (#) => {
        1
    };
    (,) => {
        0
    };
}

macro_rules! sprite_4x5_font {
    (
        $(
            $(
                ($pixel0:tt $pixel1:tt $pixel2:tt $pixel3:tt)
            )*
            ------
        )*
    ) => {
        [
            $(
                $(
                    // Shift pixels into the high nibble / left half of the sprite byte.
                    (pixel_to_bit!($pixel0) << 7
                        | pixel_to_bit!($pixel1) << 6
                        | pixel_to_bit!($pixel2) << 5
                        | pixel_to_bit!($pixel3) << 4),
                )*
            )*
        ]
    };
}

/// Bytes per glyph.
pub const GLYPH_LEN: usize = 5;
/// Number of glyphs, one per hex digit.
pub const GLYPH_COUNT: usize = 0xF + 1;
/// Length of the whole font in bytes.
pub const FONT_LEN: usize = GLYPH_LEN * GLYPH_COUNT;
/// Address of the first glyph.
pub const FONT_START: usize = 0x000;

const_assert!(FONT_START + FONT_LEN <= Memory::PROGRAM_START as usize);

/// Address of the glyph for `digit`.
///
/// No masking is applied, values above `0xF` point past the font.
pub const fn glyph_address(digit: u8) -> u16 {
    (FONT_START + digit as usize * GLYPH_LEN) as u16
}

/// The sprite bytes of a single digit, `None` if `digit > 0xF`.
pub fn glyph(digit: u8) -> Option<&'static [u8]> {
    let start = digit as usize * GLYPH_LEN;
    FONT.get(start..start + GLYPH_LEN)
}

/// The conventional CHIP-8 hex digit font.
pub const FONT: [u8; FONT_LEN] = sprite_4x5_font![
    (####)
    (#,,#)
    (#,,#)
    (#,,#)
    (####)
    ------
    (,,#,)
    (,##,)
    (,,#,)
    (,,#,)
    (,###)
    ------
    (####)
    (,,,#)
    (####)
    (#,,,)
    (####)
    ------
    (####)
    (,,,#)
    (####)
    (,,,#)
    (####)
    ------
    (#,,#)
    (#,,#)
    (####)
    (,,,#)
    (,,,#)
    ------
    (####)
    (#,,,)
    (####)
    (,,,#)
    (####)
    ------
    (####)
    (#,,,)
    (####)
    (#,,#)
    (####)
    ------
    (####)
    (,,,#)
    (,,#,)
    (,#,,)
    (,#,,)
    ------
    (####)
    (#,,#)
    (####)
    (#,,#)
    (####)
    ------
    (####)
    (#,,#)
    (####)
    (,,,#)
    (####)
    ------
    (####)
    (#,,#)
    (####)
    (#,,#)
    (#,,#)
    ------
    (###,)
    (#,,#)
    (###,)
    (#,,#)
    (###,)
    ------
    (####)
    (#,,,)
    (#,,,)
    (#,,,)
    (####)
    ------
    (###,)
    (#,,#)
    (#,,#)
    (#,,#)
    (###,)
    ------
    (####)
    (#,,,)
    (####)
    (#,,,)
    (####)
    ------
    (####)
    (#,,,)
    (####)
    (#,,,)
    (#,,,)
    ------
];
