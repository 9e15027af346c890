//! Text rendering with the handle's persistent [`FontStyle`].

use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::font::{Direction, Font, FontStyle};
use crate::surface::FrameMode;
use crate::{Error, St7789, Timer};

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "St7789",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, DC, RST, BL, E, TIMER, MODE> St7789<'b, SPI, DC, RST, BL, TIMER, MODE>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    MODE: FrameMode,
{
    /// Draw one character anchored at `(x, y)` and return the next cursor
    /// position. Characters missing from `font` draw nothing but still
    /// advance the cursor.
    pub async fn draw_char(
        &mut self,
        x: i32,
        y: i32,
        c: char,
        font: &Font<'_>,
        color: Rgb565,
    ) -> Result<(i32, i32), Error<E>> {
        let style = self.style;
        let (dx, dy) = style.direction.advance(font);
        let next = (x.saturating_add(dx), y.saturating_add(dy));
        let Some(glyph) = font.glyph(c) else {
            trace!("no glyph for {=char}", c);
            return Ok(next);
        };
        let (w, h) = (glyph.width(), glyph.height());
        if w == 0 || h == 0 {
            return Ok(next);
        }

        // An opaque upright glyph that is fully on screen goes out as one
        // window.
        if let (false, Direction::Deg0, Some(fill)) = (MODE::BUFFERED, style.direction, style.fill) {
            let (x2, y2) = (x.saturating_add(w as i32 - 1), y.saturating_add(h as i32 - 1));
            if let Some(window) = self.clip(x, y, x2, y2) {
                if window.width() == w as u32 && window.height() == h as u32 {
                    self.address(window).await?;
                    let pixels = (0..h).flat_map(move |row| {
                        (0..w).map(move |col| {
                            style
                                .color(glyph.is_set(col, row), row + 1 == h, color)
                                .unwrap_or(fill)
                        })
                    });
                    self.bus.write_pixels(pixels).await?;
                    return Ok(next);
                }
            }
        }

        for row in 0..h {
            for col in 0..w {
                let Some(pixel) = style.color(glyph.is_set(col, row), row + 1 == h, color) else {
                    continue;
                };
                let (px, py) = style.direction.place(x, y, col as i32, row as i32);
                self.set_pixel(px, py, pixel).await?;
            }
        }
        Ok(next)
    }

    /// Draw `text` left to right in the current direction, without wrapping.
    /// Returns the cursor after the last character.
    pub async fn draw_string(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &Font<'_>,
        color: Rgb565,
    ) -> Result<(i32, i32), Error<E>> {
        let mut cursor = (x, y);
        for c in text.chars() {
            cursor = self.draw_char(cursor.0, cursor.1, c, font, color).await?;
        }
        Ok(cursor)
    }
}

impl<'b, SPI, DC, RST, BL, TIMER, MODE> St7789<'b, SPI, DC, RST, BL, TIMER, MODE>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    MODE: FrameMode,
{
    pub fn font_style(&self) -> FontStyle {
        self.style
    }

    pub fn set_font_direction(&mut self, direction: Direction) {
        self.style.direction = direction;
    }

    /// Paint clear glyph bits with `color` instead of leaving them untouched.
    pub fn set_font_fill(&mut self, color: Rgb565) {
        self.style.fill = Some(color);
    }

    pub fn unset_font_fill(&mut self) {
        self.style.fill = None;
    }

    /// Force the last row of every glyph to `color`.
    pub fn set_font_underline(&mut self, color: Rgb565) {
        self.style.underline = Some(color);
    }

    pub fn unset_font_underline(&mut self) {
        self.style.underline = None;
    }
}
