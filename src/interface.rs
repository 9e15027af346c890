//! SPI bus transport: command/data framing, window addressing and chunked
//! color streaming.

use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::Error;
use crate::color::raw;
use crate::controller::Instruction;

/// Inclusive pixel rectangle in drawable coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Window {
    /// Returns `None` when the corners are out of order.
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Option<Self> {
        if x1 > x2 || y1 > y2 {
            return None;
        }
        Some(Self { x1, y1, x2, y2 })
    }

    /// Column count. A full-range window is 65536 wide, hence `u32`.
    pub const fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32 + 1
    }

    pub const fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32 + 1
    }

    /// Number of colors the panel expects after addressing this window.
    pub const fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the window lies inside a `width` x `height` surface.
    pub const fn fits(&self, width: u16, height: u16) -> bool {
        self.x2 < width && self.y2 < height
    }
}

/// Command/data transport over an [`SpiDevice`] plus the data/command line.
///
/// Every `SpiDevice` write is one bus transaction, so each chunk of a bulk
/// transfer acquires and releases the shared bus on its own. The staging
/// buffer bounds the chunk size.
///
/// A window address and the pixels that follow it are therefore not one
/// bus acquisition: DC has to change in between, which no `SpiDevice`
/// transaction can do. Other devices may use the bus between the pieces.
/// The panel ignores that traffic while deselected, so this holds only as
/// long as nothing else drives this panel's chip select or DC line.
pub struct SpiInterface<'b, SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
{
    spi: SPI,
    dc: DC,
    buffer: &'b mut [u8],
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "SpiInterface",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, DC, E> SpiInterface<'b, SPI, DC>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
{
    pub fn new(spi: SPI, dc: DC, buffer: &'b mut [u8]) -> Self {
        Self { spi, dc, buffer }
    }

    /// Largest number of pixels sent in one transaction.
    pub fn chunk_pixels(&self) -> usize {
        self.buffer.len() / 2
    }

    pub fn release(self) -> (SPI, DC, &'b mut [u8]) {
        (self.spi, self.dc, self.buffer)
    }

    /// Send a single command byte with DC low.
    pub async fn write_command(&mut self, cmd: u8) -> Result<(), Error<E>> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[cmd]).await.map_err(Error::Comm)
    }

    /// Send raw bytes with DC high.
    pub async fn write_data(&mut self, data: &[u8]) -> Result<(), Error<E>> {
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi.write(data).await.map_err(Error::Comm)
    }

    pub async fn write_data_byte(&mut self, data: u8) -> Result<(), Error<E>> {
        self.write_data(&[data]).await
    }

    /// Send a 16-bit word, most significant byte first.
    pub async fn write_data_word(&mut self, data: u16) -> Result<(), Error<E>> {
        self.write_data(&data.to_be_bytes()).await
    }

    /// Command with optional parameters
    pub async fn send(&mut self, cmd: u8, params: &[u8]) -> Result<(), Error<E>> {
        self.write_command(cmd).await?;
        if !params.is_empty() {
            self.write_data(params).await?;
        }
        Ok(())
    }

    /// Address the panel RAM rectangle and open it for writing.
    ///
    /// Coordinates are panel RAM coordinates (offsets already applied).
    pub async fn write_address_window(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
    ) -> Result<(), Error<E>> {
        let [xs_hi, xs_lo] = x1.to_be_bytes();
        let [xe_hi, xe_lo] = x2.to_be_bytes();
        self.send(Instruction::ColumnAddressSet as u8, &[xs_hi, xs_lo, xe_hi, xe_lo])
            .await?;

        let [ys_hi, ys_lo] = y1.to_be_bytes();
        let [ye_hi, ye_lo] = y2.to_be_bytes();
        self.send(Instruction::RowAddressSet as u8, &[ys_hi, ys_lo, ye_hi, ye_lo])
            .await?;

        self.write_command(Instruction::MemoryWrite as u8).await
    }

    /// Repeat one color `count` times.
    pub async fn write_color(&mut self, color: Rgb565, count: u64) -> Result<(), Error<E>> {
        if count == 0 {
            return Ok(());
        }
        let bytes = raw(color).to_be_bytes();
        let batch = self.chunk_pixels();
        if batch == 0 {
            for _ in 0..count {
                self.write_data(&bytes).await?;
            }
            return Ok(());
        }

        let filled = (batch as u64).min(count) as usize;
        for pair in self.buffer[..filled * 2].chunks_exact_mut(2) {
            pair.copy_from_slice(&bytes);
        }

        self.dc.set_high().map_err(Error::Pin)?;
        let mut remaining = count;
        while remaining > 0 {
            let pixels = remaining.min(filled as u64);
            self.spi
                .write(&self.buffer[..pixels as usize * 2])
                .await
                .map_err(Error::Comm)?;
            remaining -= pixels;
        }
        Ok(())
    }

    /// Stream a slice of arbitrary colors.
    pub async fn write_colors(&mut self, colors: &[Rgb565]) -> Result<(), Error<E>> {
        self.write_pixels(colors.iter().copied()).await
    }

    /// Stream colors from an iterator, packing them into staging-buffer sized
    /// transactions.
    pub async fn write_pixels<I>(&mut self, pixels: I) -> Result<(), Error<E>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        self.dc.set_high().map_err(Error::Pin)?;
        let capacity = self.chunk_pixels() * 2;
        let mut len = 0;
        for color in pixels {
            let bytes = raw(color).to_be_bytes();
            if capacity == 0 {
                self.spi.write(&bytes).await.map_err(Error::Comm)?;
                continue;
            }
            if len == capacity {
                self.spi
                    .write(&self.buffer[..len])
                    .await
                    .map_err(Error::Comm)?;
                len = 0;
            }
            self.buffer[len..len + 2].copy_from_slice(&bytes);
            len += 2;
        }
        if len > 0 {
            self.spi
                .write(&self.buffer[..len])
                .await
                .map_err(Error::Comm)?;
        }
        Ok(())
    }
}
