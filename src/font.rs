//! Monochrome bitmap fonts and text style.

use embedded_graphics_core::pixelcolor::Rgb565;

/// Fixed-size bitmap font over an external glyph table.
///
/// Each glyph is `height` rows of `(width + 7) / 8` bytes, most significant
/// bit leftmost. Glyphs are stored back to back in character order starting
/// at `first_char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font<'a> {
    table: &'a [u8],
    width: u8,
    height: u8,
    first_char: char,
}

impl<'a> Font<'a> {
    /// Font whose table starts at `' '`.
    pub const fn new(table: &'a [u8], width: u8, height: u8) -> Self {
        Self {
            table,
            width,
            height,
            first_char: ' ',
        }
    }

    pub const fn with_first_char(mut self, first_char: char) -> Self {
        self.first_char = first_char;
        self
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn height(&self) -> u8 {
        self.height
    }

    const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    const fn glyph_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    /// Bitmap for `c`, or `None` when the table does not cover it.
    pub fn glyph(&self, c: char) -> Option<Glyph<'a>> {
        let index = (c as u32).checked_sub(self.first_char as u32)? as usize;
        let size = self.glyph_bytes();
        let start = index.checked_mul(size)?;
        let bits = self.table.get(start..start.checked_add(size)?)?;
        Some(Glyph {
            bits,
            row_bytes: self.row_bytes(),
            width: self.width,
            height: self.height,
        })
    }
}

/// One glyph bitmap.
#[derive(Debug, Clone, Copy)]
pub struct Glyph<'a> {
    bits: &'a [u8],
    row_bytes: usize,
    width: u8,
    height: u8,
}

impl Glyph<'_> {
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether the pixel at `(col, row)` is set.
    pub fn is_set(&self, col: u8, row: u8) -> bool {
        let byte = self.bits[row as usize * self.row_bytes + col as usize / 8];
        byte & (0x80 >> (col % 8)) != 0
    }
}

/// Text direction, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Direction {
    /// Screen position of glyph pixel `(col, row)` for a glyph anchored at
    /// `(x, y)`.
    pub fn place(self, x: i32, y: i32, col: i32, row: i32) -> (i32, i32) {
        match self {
            Direction::Deg0 => (x.saturating_add(col), y.saturating_add(row)),
            Direction::Deg90 => (x.saturating_sub(row), y.saturating_add(col)),
            Direction::Deg180 => (x.saturating_sub(col), y.saturating_sub(row)),
            Direction::Deg270 => (x.saturating_add(row), y.saturating_sub(col)),
        }
    }

    /// Cursor step after one character of `font`.
    pub fn advance(self, font: &Font<'_>) -> (i32, i32) {
        let (w, h) = (font.width() as i32, font.height() as i32);
        match self {
            Direction::Deg0 => (w, 0),
            Direction::Deg90 => (0, h),
            Direction::Deg180 => (-w, 0),
            Direction::Deg270 => (0, -h),
        }
    }
}

/// Persistent text style of a display handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FontStyle {
    pub direction: Direction,
    /// Background for clear bits; `None` leaves them untouched.
    pub fill: Option<Rgb565>,
    /// Color forced onto the last glyph row.
    pub underline: Option<Rgb565>,
}

impl FontStyle {
    /// Color of one glyph pixel, or `None` when it stays transparent.
    pub fn color(&self, set: bool, last_row: bool, foreground: Rgb565) -> Option<Rgb565> {
        if last_row && self.underline.is_some() {
            return self.underline;
        }
        if set { Some(foreground) } else { self.fill }
    }
}
