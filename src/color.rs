//! RGB565 helpers on top of `embedded-graphics-core`.

use embedded_graphics_core::pixelcolor::{Rgb565, raw::RawU16};
use embedded_graphics_core::prelude::RawData;

/// Pack 8-bit red/green/blue channels into RGB565 (5/6/5 bits).
pub const fn rgb565(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Raw 16-bit value of a color, as sent on the wire.
#[inline]
pub fn raw(color: Rgb565) -> u16 {
    RawU16::from(color).into_inner()
}

/// Inverse of [`raw`].
#[inline]
pub fn from_raw(value: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(value))
}

// Primary colors are available through `embedded_graphics_core::pixelcolor::RgbColor`.
pub const GRAY: Rgb565 = rgb565(128, 128, 128);
pub const ORANGE: Rgb565 = rgb565(255, 196, 100);
pub const PURPLE: Rgb565 = rgb565(128, 0, 128);
pub const CYAN: Rgb565 = rgb565(0, 156, 209);
