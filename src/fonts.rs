//! Built-in glyph tables.

use crate::font::Font;

/// Bold 12x16 digits `'0'..='9'`.
pub const DIGITS_12X16: Font<'static> = Font::new(&DIGITS_12X16_DATA, 12, 16).with_first_char('0');

#[rustfmt::skip]
const DIGITS_12X16_DATA: [u8; 320] = [
    // '0'
    0x3F, 0xC0, 0x7F, 0xE0, 0xE0, 0x70, 0xC0, 0x30,
    0xC0, 0x30, 0xC0, 0x30, 0xC0, 0x30, 0xC0, 0x30,
    0xC0, 0x30, 0xC0, 0x30, 0xC0, 0x30, 0xC0, 0x30,
    0xE0, 0x70, 0x7F, 0xE0, 0x3F, 0xC0, 0x00, 0x00,
    // '1'
    0x0C, 0x00, 0x1C, 0x00, 0x3C, 0x00, 0x0C, 0x00,
    0x0C, 0x00, 0x0C, 0x00, 0x0C, 0x00, 0x0C, 0x00,
    0x0C, 0x00, 0x0C, 0x00, 0x0C, 0x00, 0x0C, 0x00,
    0x0C, 0x00, 0x3F, 0x00, 0x3F, 0x00, 0x00, 0x00,
    // '2'
    0x3F, 0xC0, 0x7F, 0xE0, 0xE0, 0x70, 0x00, 0x30,
    0x00, 0x30, 0x00, 0x70, 0x00, 0xE0, 0x01, 0xC0,
    0x03, 0x80, 0x07, 0x00, 0x0E, 0x00, 0x1C, 0x00,
    0x38, 0x00, 0x7F, 0xF0, 0xFF, 0xF0, 0x00, 0x00,
    // '3'
    0x3F, 0xC0, 0x7F, 0xE0, 0xE0, 0x70, 0x00, 0x30,
    0x00, 0x30, 0x00, 0x70, 0x0F, 0xE0, 0x0F, 0xE0,
    0x00, 0x70, 0x00, 0x30, 0x00, 0x30, 0xE0, 0x70,
    0x7F, 0xE0, 0x3F, 0xC0, 0x00, 0x00, 0x00, 0x00,
    // '4'
    0x01, 0xC0, 0x03, 0xC0, 0x07, 0xC0, 0x0D, 0xC0,
    0x19, 0xC0, 0x31, 0xC0, 0x61, 0xC0, 0xC1, 0xC0,
    0xFF, 0xF0, 0xFF, 0xF0, 0x01, 0xC0, 0x01, 0xC0,
    0x01, 0xC0, 0x01, 0xC0, 0x01, 0xC0, 0x00, 0x00,
    // '5'
    0xFF, 0xF0, 0xFF, 0xF0, 0xE0, 0x00, 0xE0, 0x00,
    0xE0, 0x00, 0xE0, 0x00, 0xFF, 0xC0, 0xFF, 0xE0,
    0x00, 0x70, 0x00, 0x30, 0x00, 0x30, 0xE0, 0x70,
    0x7F, 0xE0, 0x3F, 0xC0, 0x00, 0x00, 0x00, 0x00,
    // '6'
    0x1F, 0xC0, 0x3F, 0xE0, 0x70, 0x70, 0xE0, 0x00,
    0xE0, 0x00, 0xE0, 0x00, 0xFF, 0xC0, 0xFF, 0xE0,
    0xE0, 0x70, 0xE0, 0x30, 0xE0, 0x30, 0x70, 0x70,
    0x7F, 0xE0, 0x3F, 0xC0, 0x00, 0x00, 0x00, 0x00,
    // '7'
    0xFF, 0xF0, 0xFF, 0xF0, 0x00, 0x30, 0x00, 0x60,
    0x00, 0xC0, 0x01, 0x80, 0x03, 0x00, 0x06, 0x00,
    0x0C, 0x00, 0x18, 0x00, 0x30, 0x00, 0x60, 0x00,
    0xC0, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0x00, 0x00,
    // '8'
    0x3F, 0xC0, 0x7F, 0xE0, 0xE0, 0x70, 0xE0, 0x70,
    0xE0, 0x70, 0x70, 0xE0, 0x3F, 0xC0, 0x7F, 0xE0,
    0xE0, 0x70, 0xE0, 0x70, 0xE0, 0x70, 0xE0, 0x70,
    0x7F, 0xE0, 0x3F, 0xC0, 0x00, 0x00, 0x00, 0x00,
    // '9'
    0x3F, 0xC0, 0x7F, 0xE0, 0xE0, 0x70, 0xC0, 0x30,
    0xC0, 0x30, 0xE0, 0x70, 0x7F, 0xF0, 0x3F, 0xF0,
    0x00, 0x70, 0x00, 0x70, 0x00, 0x70, 0xE0, 0xE0,
    0x7F, 0xC0, 0x3F, 0x80, 0x00, 0x00, 0x00, 0x00,
];
