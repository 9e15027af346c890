#![no_std]

#[cfg(test)]
extern crate std;

// must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod color;
mod controller;
mod draw;
mod font;
#[cfg(feature = "font-rendering")]
pub mod fonts;
mod interface;
pub mod primitives;
mod surface;
mod text;

#[cfg(test)]
mod mock;

use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

pub use controller::{GRAM_HEIGHT, InitStep, Instruction, Orientation, ST7789_INIT, State};
pub use font::{Direction, Font, FontStyle, Glyph};
pub use interface::{SpiInterface, Window};
pub use surface::{Buffered, Direct, FrameMode, ScrollDirection};

#[derive(Clone, Copy)]
pub struct Config {
    /// RGB subpixel order; `false` sets the BGR bit in MADCTL.
    pub rgb: bool,
    pub inverted: bool,
    pub orientation: Orientation,
    pub width: u16,
    pub height: u16,
    /// Column offset of the visible area inside the controller RAM.
    pub dx: u16,
    /// Row offset of the visible area inside the controller RAM.
    pub dy: u16,
    pub init_sequence: &'static [InitStep],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rgb: true,
            inverted: true,
            orientation: Orientation::Deg0,
            width: 240,
            height: 240,
            dx: 0,
            dy: 0,
            init_sequence: ST7789_INIT,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Pin setting error
    Pin(Infallible),
    /// Malformed window, polygon with fewer than 3 sides, frame of the wrong
    /// size or a scroll area taller than the controller RAM
    InvalidArgument,
    /// Bus operation before `init` completed
    NotReady,
}

/// ST7789 display handle.
///
/// `MODE` is [`Direct`] (every draw goes to the panel) or [`Buffered`] (draws
/// land in an owned frame until [`St7789::flush`]).
pub struct St7789<'b, SPI, DC, RST, BL, TIMER, MODE = Direct>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    bus: SpiInterface<'b, SPI, DC>,
    rst: RST,
    bl: BL,
    config: Config,
    state: State,
    /// Drawable size and RAM offsets for the current orientation.
    width: u16,
    height: u16,
    dx: u16,
    dy: u16,
    orientation: Orientation,
    style: FontStyle,
    mode: MODE,
    _timer: core::marker::PhantomData<TIMER>,
}

impl<'b, SPI, DC, RST, BL, E, TIMER> St7789<'b, SPI, DC, RST, BL, TIMER, Direct>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    /// Handle that draws straight to the panel. `buffer` stages bus
    /// transfers; its length bounds every transaction.
    pub fn new(config: Config, spi: SPI, dc: DC, rst: RST, bl: BL, buffer: &'b mut [u8]) -> Self {
        Self::with_mode(config, spi, dc, rst, bl, buffer, Direct)
    }
}

impl<'b, SPI, DC, RST, BL, E, TIMER, B> St7789<'b, SPI, DC, RST, BL, TIMER, Buffered<B>>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    B: AsMut<[Rgb565]> + AsRef<[Rgb565]>,
{
    /// Handle that draws into `frame` and pushes it on
    /// [`St7789::flush`]. `frame` must hold exactly `width * height` pixels.
    pub fn new_buffered(
        config: Config,
        spi: SPI,
        dc: DC,
        rst: RST,
        bl: BL,
        buffer: &'b mut [u8],
        frame: B,
    ) -> Result<Self, Error<E>> {
        let expected = config.width as usize * config.height as usize;
        if frame.as_ref().len() != expected {
            warn!(
                "frame holds {=usize} pixels, panel needs {=usize}",
                frame.as_ref().len(),
                expected
            );
            return Err(Error::InvalidArgument);
        }
        Ok(Self::with_mode(
            config,
            spi,
            dc,
            rst,
            bl,
            buffer,
            Buffered::new(frame),
        ))
    }
}

impl<'b, SPI, DC, RST, BL, E, TIMER, MODE> St7789<'b, SPI, DC, RST, BL, TIMER, MODE>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    fn with_mode(
        config: Config,
        spi: SPI,
        dc: DC,
        rst: RST,
        bl: BL,
        buffer: &'b mut [u8],
        mode: MODE,
    ) -> Self {
        Self {
            bus: SpiInterface::new(spi, dc, buffer),
            rst,
            bl,
            config,
            state: State::Uninitialized,
            width: config.width,
            height: config.height,
            dx: config.dx,
            dy: config.dy,
            orientation: config.orientation,
            style: FontStyle::default(),
            mode,
            _timer: core::marker::PhantomData,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drawable width in the current orientation.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Drawable height in the current orientation.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the RAM offsets, given for the native (0 degree) orientation.
    pub fn set_offset(&mut self, dx: u16, dy: u16) {
        self.config.dx = dx;
        self.config.dy = dy;
        if self.orientation.is_swapped() {
            (self.dx, self.dy) = (dy, dx);
        } else {
            (self.dx, self.dy) = (dx, dy);
        }
    }

    /// Give back the peripherals, the staging buffer and the mode (which
    /// owns the frame in buffered mode).
    pub fn release(self) -> (SPI, DC, RST, BL, &'b mut [u8], MODE) {
        let (spi, dc, buffer) = self.bus.release();
        (spi, dc, self.rst, self.bl, buffer, self.mode)
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), Error<E>> {
        if self.state != State::Ready {
            return Err(Error::NotReady);
        }
        Ok(())
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Simplified timer trait for delay operations.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by `embassy-time`.
#[cfg(feature = "embassy-time")]
pub struct EmbassyTimer;

#[cfg(all(feature = "embassy-time", feature = "async"))]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

#[cfg(all(feature = "embassy-time", not(feature = "async")))]
impl Timer for EmbassyTimer {
    fn delay_ms(milliseconds: u64) {
        embassy_time::block_for(embassy_time::Duration::from_millis(milliseconds));
    }
}
