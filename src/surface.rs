//! Frame surface: where pixel writes land.
//!
//! The mode is a type parameter of [`St7789`], chosen once at construction:
//!
//! - [`Direct`]: every pixel write addresses a window and streams it to the
//!   panel immediately.
//! - [`Buffered`]: pixel writes only touch an owned `width * height` frame;
//!   [`St7789::flush`] sends the whole frame in one window write.
//!
//! Coordinates outside the drawable area are ignored, never an error.

use core::convert::Infallible;

use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::Pixel;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::color::raw;
use crate::interface::Window;
use crate::{Error, St7789, Timer};

mod private {
    pub trait Sealed {}
}

/// Rendering strategy of a display handle.
pub trait FrameMode: private::Sealed {
    const BUFFERED: bool;

    /// The local frame, if this mode keeps one.
    fn frame_mut(&mut self) -> Option<&mut [Rgb565]>;
}

/// Pixels go straight to the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl private::Sealed for Direct {}

impl FrameMode for Direct {
    const BUFFERED: bool = false;

    #[inline]
    fn frame_mut(&mut self) -> Option<&mut [Rgb565]> {
        None
    }
}

/// Pixels go to an owned frame until flushed.
pub struct Buffered<B> {
    pixels: B,
}

impl<B> Buffered<B>
where
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    pub fn new(pixels: B) -> Self {
        Self { pixels }
    }

    pub fn len(&self) -> usize {
        self.pixels.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> B {
        self.pixels
    }

    fn get(&self, width: u16, x: u16, y: u16) -> Rgb565 {
        self.pixels.as_ref()[y as usize * width as usize + x as usize]
    }
}

impl<B> private::Sealed for Buffered<B> {}

impl<B> FrameMode for Buffered<B>
where
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    const BUFFERED: bool = true;

    #[inline]
    fn frame_mut(&mut self) -> Option<&mut [Rgb565]> {
        Some(self.pixels.as_mut())
    }
}

/// Direction for [`St7789::wrap_around`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    Right,
    Left,
    Down,
    Up,
}

fn fill_window(pixels: &mut [Rgb565], width: u16, window: Window, color: Rgb565) {
    for y in window.y1..=window.y2 {
        let row = y as usize * width as usize;
        pixels[row + window.x1 as usize..=row + window.x2 as usize].fill(color);
    }
}

/// Rotate rows (left/right) or columns (up/down) `start..=end` by one pixel,
/// wrapping the pixel that falls off onto the opposite edge.
fn wrap(
    pixels: &mut [Rgb565],
    width: u16,
    height: u16,
    direction: ScrollDirection,
    start: u16,
    end: u16,
) {
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return;
    }
    match direction {
        ScrollDirection::Right | ScrollDirection::Left => {
            for y in start as usize..=(end as usize).min(h - 1) {
                let row = &mut pixels[y * w..(y + 1) * w];
                if direction == ScrollDirection::Right {
                    row.rotate_right(1);
                } else {
                    row.rotate_left(1);
                }
            }
        }
        ScrollDirection::Down | ScrollDirection::Up => {
            for x in start as usize..=(end as usize).min(w - 1) {
                if direction == ScrollDirection::Down {
                    let last = pixels[(h - 1) * w + x];
                    for y in (1..h).rev() {
                        pixels[y * w + x] = pixels[(y - 1) * w + x];
                    }
                    pixels[x] = last;
                } else {
                    let first = pixels[x];
                    for y in 0..h - 1 {
                        pixels[y * w + x] = pixels[(y + 1) * w + x];
                    }
                    pixels[(h - 1) * w + x] = first;
                }
            }
        }
    }
}

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
    /// Address a drawable-coordinate window on the panel, offsets applied.
    pub(crate) async fn address(&mut self, window: Window) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bus
            .write_address_window(
                window.x1 + self.dx,
                window.y1 + self.dy,
                window.x2 + self.dx,
                window.y2 + self.dy,
            )
            .await
    }

    /// Draw a single pixel (basic drawing primitive)
    pub async fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Error<E>> {
        let Some(window) = self.clip(x, y, x, y) else {
            return Ok(()); // Outside bounds
        };
        let index = window.y1 as usize * self.width as usize + window.x1 as usize;
        if let Some(frame) = self.mode.frame_mut() {
            frame[index] = color;
            return Ok(());
        }

        self.address(window).await?;
        self.bus.write_data_word(raw(color)).await
    }

    /// Write a horizontal run of colors starting at `(x, y)`; pixels past the
    /// edges are dropped.
    pub async fn set_pixels(&mut self, x: i32, y: i32, colors: &[Rgb565]) -> Result<(), Error<E>> {
        if colors.is_empty() {
            return Ok(());
        }
        let last = x.saturating_add(colors.len() as i32 - 1);
        let Some(window) = self.clip(x, y, last, y) else {
            return Ok(());
        };
        let skip = (window.x1 as i32 - x) as usize;
        let visible = &colors[skip..skip + window.width() as usize];

        let start = window.y1 as usize * self.width as usize + window.x1 as usize;
        if let Some(frame) = self.mode.frame_mut() {
            frame[start..start + visible.len()].copy_from_slice(visible);
            return Ok(());
        }

        self.address(window).await?;
        self.bus.write_colors(visible).await
    }

    /// Solid rectangle between two inclusive corners, clipped to the panel.
    pub(crate) async fn fill_area(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let Some(window) = self.clip(x1, y1, x2, y2) else {
            return Ok(());
        };
        let width = self.width;
        if let Some(frame) = self.mode.frame_mut() {
            fill_window(frame, width, window, color);
            return Ok(());
        }

        self.address(window).await?;
        self.bus.write_color(color, window.pixel_count()).await
    }

    /// Fill entire screen with a single color
    pub async fn fill_screen(&mut self, color: Rgb565) -> Result<(), Error<E>> {
        let (w, h) = (self.width as i32, self.height as i32);
        self.fill_area(0, 0, w - 1, h - 1, color).await
    }

    /// Push the local frame to the panel as one window write. No-op in
    /// direct mode.
    pub async fn flush(&mut self) -> Result<(), Error<E>> {
        if !MODE::BUFFERED {
            return Ok(());
        }
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.address(Window {
            x1: 0,
            y1: 0,
            x2: w - 1,
            y2: h - 1,
        })
        .await?;
        if let Some(frame) = self.mode.frame_mut() {
            self.bus.write_colors(frame).await?;
        }
        Ok(())
    }

    /// Make everything drawn so far visible; required in buffered mode.
    pub async fn finish(&mut self) -> Result<(), Error<E>> {
        self.flush().await
    }

    /// Raw window write, straight to the panel in both modes.
    ///
    /// The window is validated before any bus traffic. `colors` is streamed
    /// as given: the panel expects exactly `(x2 - x1 + 1) * (y2 - y1 + 1)`
    /// values, and a shorter or longer slice leaves its address pointer out
    /// of step until the next window command. Nothing is padded or trimmed.
    pub async fn write_window(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        colors: &[Rgb565],
    ) -> Result<(), Error<E>> {
        let window = Window::new(x1, y1, x2, y2)
            .filter(|w| w.fits(self.width, self.height))
            .ok_or(Error::InvalidArgument)?;
        if colors.len() as u64 != window.pixel_count() {
            warn!(
                "window write of {=usize} colors into {=u64} pixels",
                colors.len(),
                window.pixel_count()
            );
        }
        self.address(window).await?;
        self.bus.write_colors(colors).await
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
    /// Intersect an inclusive rectangle (corners in any order) with the
    /// drawable area.
    pub(crate) fn clip(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Window> {
        let (w, h) = (self.width as i32, self.height as i32);
        let (x1, x2) = (x1.min(x2).max(0), x1.max(x2).min(w - 1));
        let (y1, y2) = (y1.min(y2).max(0), y1.max(y2).min(h - 1));
        if x1 > x2 || y1 > y2 {
            return None;
        }
        Window::new(x1 as u16, y1 as u16, x2 as u16, y2 as u16)
    }
}

impl<'b, SPI, DC, RST, BL, TIMER, B> St7789<'b, SPI, DC, RST, BL, TIMER, Buffered<B>>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    /// Read back a pixel of the local frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        let window = self.clip(x, y, x, y)?;
        Some(self.mode.get(self.width, window.x1, window.y1))
    }

    /// The local frame in row-major order of the current orientation.
    pub fn frame(&self) -> &[Rgb565] {
        self.mode.pixels.as_ref()
    }

    /// Shift the local frame by one pixel with wrap-around: rows
    /// `start..=end` for [`ScrollDirection::Left`]/[`ScrollDirection::Right`],
    /// columns `start..=end` for [`ScrollDirection::Up`]/[`ScrollDirection::Down`].
    /// Call [`St7789::flush`] to show the result.
    pub fn wrap_around(&mut self, direction: ScrollDirection, start: u16, end: u16) {
        if start > end {
            return;
        }
        let (w, h) = (self.width, self.height);
        wrap(self.mode.pixels.as_mut(), w, h, direction, start, end);
    }
}

impl<'b, SPI, DC, RST, BL, TIMER, B> OriginDimensions
    for St7789<'b, SPI, DC, RST, BL, TIMER, Buffered<B>>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

/// Lets `embedded-graphics` render into the local frame; nothing reaches the
/// panel until [`St7789::flush`].
impl<'b, SPI, DC, RST, BL, TIMER, B> DrawTarget for St7789<'b, SPI, DC, RST, BL, TIMER, Buffered<B>>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let width = self.width as usize;
        for Pixel(point, color) in pixels {
            if let Some(window) = self.clip(point.x, point.y, point.x, point.y) {
                self.mode.pixels.as_mut()[window.y1 as usize * width + window.x1 as usize] =
                    color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb565;
    use crate::mock::{block_on, buffered, direct};
    use embedded_graphics_core::pixelcolor::RgbColor;
    use embedded_graphics_core::primitives::Rectangle;
    use embedded_graphics_core::geometry::Point;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn direct_pixel_is_window_then_word() {
        let (mut display, wire) = direct(240, 240);
        block_on(display.set_pixel(10, 20, Rgb565::RED)).unwrap();
        assert_eq!(
            wire.frames(),
            vec![
                (0x2A, vec![0, 10, 0, 10]),
                (0x2B, vec![0, 20, 0, 20]),
                (0x2C, vec![0xF8, 0x00]),
            ]
        );
    }

    #[test]
    fn out_of_range_pixels_are_ignored() {
        let (mut display, wire) = direct(240, 240);
        block_on(display.set_pixel(-1, 5, Rgb565::RED)).unwrap();
        block_on(display.set_pixel(240, 5, Rgb565::RED)).unwrap();
        block_on(display.set_pixel(5, 240, Rgb565::RED)).unwrap();
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn offsets_shift_panel_addresses() {
        let (mut display, wire) = direct(240, 240);
        display.set_offset(0, 80);
        block_on(display.set_pixel(1, 2, Rgb565::BLUE)).unwrap();
        assert_eq!(wire.windows(), vec![(1, 82, 1, 82)]);
    }

    #[test]
    fn buffered_pixel_reads_back() {
        let (mut display, wire) = buffered(32, 24);
        for (i, (x, y)) in [(0, 0), (31, 0), (0, 23), (31, 23), (7, 9)].into_iter().enumerate() {
            let color = rgb565(i as u8 * 40, 255 - i as u8 * 30, 3);
            block_on(display.set_pixel(x, y, color)).unwrap();
            assert_eq!(display.pixel(x, y), Some(color));
        }
        assert_eq!(display.pixel(32, 0), None);
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn runs_are_clipped_per_pixel() {
        let (mut display, wire) = direct(16, 16);
        let colors = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE];
        block_on(display.set_pixels(-2, 3, &colors)).unwrap();
        assert_eq!(wire.windows(), vec![(0, 3, 1, 3)]);
        assert_eq!(wire.pixel_bytes(), [0x00, 0x1F, 0xFF, 0xFF]);

        let (mut display, _) = buffered(16, 16);
        block_on(display.set_pixels(14, 0, &colors)).unwrap();
        assert_eq!(display.pixel(14, 0), Some(Rgb565::RED));
        assert_eq!(display.pixel(15, 0), Some(Rgb565::GREEN));
        assert_eq!(display.pixel(0, 1), Some(Rgb565::BLACK));
    }

    #[test]
    fn flush_sends_whole_frame_once() {
        let (mut display, wire) = buffered(8, 4);
        block_on(display.fill_screen(Rgb565::GREEN)).unwrap();
        block_on(display.set_pixel(3, 2, Rgb565::RED)).unwrap();
        assert!(wire.frames().is_empty());

        block_on(display.flush()).unwrap();
        assert_eq!(wire.windows(), vec![(0, 0, 7, 3)]);
        let data = wire.pixel_bytes();
        assert_eq!(data.len(), 8 * 4 * 2);
        let at = (2 * 8 + 3) * 2;
        assert_eq!(data[at..at + 2], [0xF8, 0x00]);
        assert_eq!(data[0..2], [0x07, 0xE0]);
    }

    #[test]
    fn failed_flush_is_restored_by_the_next_one() {
        // 128 bytes of frame over a 64 byte staging buffer: two chunks
        let (mut display, wire) = buffered(8, 8);
        block_on(display.fill_screen(Rgb565::BLUE)).unwrap();
        block_on(display.set_pixel(6, 7, Rgb565::RED)).unwrap();

        // CASET, params, RASET, params, RAMWR, first chunk, then the second fails
        wire.fail_at(6);
        let result = block_on(display.flush());
        assert!(matches!(result, Err(Error::Comm(_))));
        assert_eq!(wire.pixel_bytes().len(), 64);

        wire.clear();
        block_on(display.flush()).unwrap();
        let expected: Vec<u8> = display.frame().iter().flat_map(|&c| raw(c).to_be_bytes()).collect();
        assert_eq!(wire.pixel_bytes(), expected);
        assert_eq!(expected.len(), 128);
        assert_eq!(wire.windows(), vec![(0, 0, 7, 7)]);
    }

    #[test]
    fn flush_is_noop_in_direct_mode() {
        let (mut display, wire) = direct(8, 8);
        block_on(display.finish()).unwrap();
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn drawing_before_init_is_rejected_on_the_bus() {
        let (mut display, wire) = crate::mock::raw_display(crate::mock::config(8, 8));
        let result = block_on(display.set_pixel(1, 1, Rgb565::RED));
        assert!(matches!(result, Err(Error::NotReady)));
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn window_write_validates_before_traffic() {
        let (mut display, wire) = direct(16, 16);
        let colors = [Rgb565::RED; 4];
        assert!(matches!(
            block_on(display.write_window(3, 0, 2, 1, &colors)),
            Err(Error::InvalidArgument)
        ));
        assert!(matches!(
            block_on(display.write_window(0, 0, 16, 0, &colors)),
            Err(Error::InvalidArgument)
        ));
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn short_window_write_is_not_padded() {
        let (mut display, wire) = direct(16, 16);
        let colors = [Rgb565::BLUE; 3];
        block_on(display.write_window(0, 0, 1, 1, &colors)).unwrap();
        assert_eq!(wire.windows(), vec![(0, 0, 1, 1)]);
        assert_eq!(wire.pixel_bytes().len(), 3 * 2);
    }

    #[test]
    fn wrap_around_rotates_rows_and_columns() {
        let (mut display, _) = buffered(4, 3);
        block_on(display.set_pixel(3, 1, Rgb565::RED)).unwrap();
        display.wrap_around(ScrollDirection::Right, 1, 1);
        assert_eq!(display.pixel(0, 1), Some(Rgb565::RED));
        display.wrap_around(ScrollDirection::Left, 0, 2);
        assert_eq!(display.pixel(3, 1), Some(Rgb565::RED));

        display.wrap_around(ScrollDirection::Down, 3, 3);
        assert_eq!(display.pixel(3, 2), Some(Rgb565::RED));
        display.wrap_around(ScrollDirection::Down, 0, 3);
        assert_eq!(display.pixel(3, 0), Some(Rgb565::RED));
        display.wrap_around(ScrollDirection::Up, 3, 3);
        assert_eq!(display.pixel(3, 2), Some(Rgb565::RED));
        let reds: Vec<_> = display.frame().iter().filter(|&&c| c == Rgb565::RED).collect();
        assert_eq!(reds.len(), 1);
    }

    #[test]
    fn draw_target_renders_into_frame() {
        let (mut display, wire) = buffered(10, 10);
        let area = Rectangle::new(Point::new(2, 3), Size::new(3, 2));
        display.fill_solid(&area, Rgb565::CYAN).unwrap();
        assert_eq!(display.pixel(2, 3), Some(Rgb565::CYAN));
        assert_eq!(display.pixel(4, 4), Some(Rgb565::CYAN));
        assert_eq!(display.pixel(5, 4), Some(Rgb565::BLACK));
        assert_eq!(display.size(), Size::new(10, 10));
        assert!(wire.frames().is_empty());
    }
}
