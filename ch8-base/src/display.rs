use std::fmt::{self, Debug, Write};

/// The 64×32 monochrome display.
///
/// Pixels are packed 8 to a byte, most significant bit leftmost, rows top to bottom.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Display {
    pixel_data: [u8; Self::WIDTH_BYTES * Self::HEIGHT],
}

impl Display {
    /// Width in bytes.
    pub const WIDTH_BYTES: usize = 8;
    /// Width in pixels.
    pub const WIDTH: usize = Self::WIDTH_BYTES * u8::BITS as usize;
    /// Height in pixels.
    pub const HEIGHT: usize = 32;

    /// XOR `byte` onto the display at pixel column `byte_x * 8` of row `y`.
    ///
    /// Returns `true` if a set pixel has been unset.
    fn draw_byte(&mut self, byte_x: usize, y: usize, byte: u8) -> bool {
        let cell = &mut self.pixel_data[byte_x + y * Self::WIDTH_BYTES];
        // Collision is judged on the pixels as they were before this byte is applied.
        let set_pixel_unset = *cell & byte > 0;
        *cell ^= byte;
        set_pixel_unset
    }

    /// XOR a sprite onto the display with its top left corner at (`x`, `y`).
    ///
    /// The origin is taken modulo the display size and every row and column that crosses an
    /// edge reappears at the opposite one.
    ///
    /// Returns `true` if any set pixel has been unset.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x = x as usize % Self::WIDTH;
        let y = y as usize % Self::HEIGHT;
        let shift = x % 8;
        let mut set_pixel_unset = false;

        for (i, &sprite_byte) in sprite.iter().enumerate() {
            let row = (y + i) % Self::HEIGHT;

            set_pixel_unset |= self.draw_byte(x / 8, row, sprite_byte >> shift);

            // Byte aligned, nothing spills into the next display byte.
            if shift == 0 {
                continue;
            }

            let spill_x = (x / 8 + 1) % Self::WIDTH_BYTES;
            set_pixel_unset |= self.draw_byte(spill_x, row, sprite_byte << (8 - shift));
        }

        set_pixel_unset
    }

    pub fn clear(&mut self) {
        self.pixel_data.fill(0);
    }

    /// Whether the pixel at (`x`, `y`) is set. Coordinates wrap like sprite positions do.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let x = x % Self::WIDTH;
        let y = y % Self::HEIGHT;
        self.pixel_data[x / 8 + y * Self::WIDTH_BYTES] >> (7 - x % 8) & 1 > 0
    }

    /// Packed pixel rows, see [`Display`].
    pub fn as_bytes(&self) -> &[u8; Self::WIDTH_BYTES * Self::HEIGHT] {
        &self.pixel_data
    }

    /// Rows of pixels, `true` meaning set.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = bool> + '_> + '_ {
        self.pixel_data.chunks_exact(Self::WIDTH_BYTES).map(|row| {
            row.iter()
                .flat_map(|&byte| (0..8).rev().map(move |i| byte >> i & 1 > 0))
        })
    }

    pub fn lit_pixel_count(&self) -> usize {
        self.pixel_data
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }
}

impl Default for Display {
    fn default() -> Self {
        Self {
            pixel_data: [0; Self::WIDTH_BYTES * Self::HEIGHT],
        }
    }
}

impl fmt::Display for Display {
    /// One line per row, `#` for set and `.` for unset pixels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for pixel in row {
                f.write_char(if pixel { '#' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Display(")?;
            fmt::Display::fmt(self, f)?;
            write!(f, ")")
        } else {
            f.debug_tuple("Display").field(&self.pixel_data).finish()
        }
    }
}
