//! Controller command set, power-up sequencing and panel-level toggles.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::surface::FrameMode;
use crate::{Error, St7789, Timer};

/// Rows of display RAM behind the panel, independent of the visible height.
pub const GRAM_HEIGHT: u16 = 320;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    /// No Operation (00h)
    Nop = 0x00,
    /// Software Reset (01h) - Restore register defaults
    SoftwareReset = 0x01,

    /// Sleep In (10h) - Enter low-power mode
    SleepIn = 0x10,
    /// Sleep Out (11h) - Exit low-power mode, needs 120 ms before the next sleep command
    SleepOut = 0x11,
    /// Partial Display Mode On (12h)
    PartialModeOn = 0x12,
    /// Normal Display Mode On (13h)
    NormalDisplayOn = 0x13,

    /// Display Inversion Off (20h)
    DisplayInversionOff = 0x20,
    /// Display Inversion On (21h)
    DisplayInversionOn = 0x21,

    /// Display Off (28h)
    DisplayOff = 0x28,
    /// Display On (29h)
    DisplayOn = 0x29,
    /// Column Address Set (2Ah) - Horizontal addressing bounds
    ColumnAddressSet = 0x2A,
    /// Row Address Set (2Bh) - Vertical addressing bounds
    RowAddressSet = 0x2B,
    /// Memory Write (2Ch) - Following data goes to the addressed window
    MemoryWrite = 0x2C,

    /// Vertical Scrolling Definition (33h) - Top fixed, scroll, bottom fixed rows
    VerticalScrollDefinition = 0x33,
    /// Memory Access Control (36h) - GRAM orientation/order
    MemoryAccessControl = 0x36,
    /// Vertical Scroll Start Address (37h)
    VerticalScrollStart = 0x37,
    /// Interface Pixel Format (3Ah) - Color depth configuration
    PixelFormatSet = 0x3A,

    /// Porch Setting (B2h)
    PorchControl = 0xB2,
    /// Gate Control (B7h) - VGH/VGL levels
    GateControl = 0xB7,
    /// VCOM Setting (BBh)
    VcomSetting = 0xBB,
    /// LCM Control (C0h)
    LcmControl = 0xC0,
    /// VDV and VRH Command Enable (C2h)
    VdvVrhEnable = 0xC2,
    /// VRH Set (C3h)
    VrhSet = 0xC3,
    /// VDV Set (C4h)
    VdvSet = 0xC4,
    /// Frame Rate Control in Normal Mode (C6h)
    FrameRateControl = 0xC6,
    /// Power Control 1 (D0h) - AVDD/AVCL/VDS
    PowerControl1 = 0xD0,

    /// Positive Voltage Gamma Control (E0h)
    PositiveGamma = 0xE0,
    /// Negative Voltage Gamma Control (E1h)
    NegativeGamma = 0xE1,
}

/// Memory-access-control orientations; the discriminant is the MADCTL byte
/// in RGB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    Deg0 = 0x00,
    Deg90 = 0x60,
    Deg180 = 0xC0,
    Deg270 = 0xA0,
}

const MADCTL_BGR: u8 = 0x08;

impl Orientation {
    /// MADCTL byte for this orientation.
    pub const fn madctl(self, rgb: bool) -> u8 {
        if rgb { self as u8 } else { self as u8 | MADCTL_BGR }
    }

    /// Row/column exchange: drawable width and height are swapped.
    pub const fn is_swapped(self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for Orientation {
    type Error = ();

    fn try_from(degrees: u16) -> Result<Self, ()> {
        match degrees {
            0 => Ok(Orientation::Deg0),
            90 => Ok(Orientation::Deg90),
            180 => Ok(Orientation::Deg180),
            270 => Ok(Orientation::Deg270),
            _ => Err(()),
        }
    }
}

/// Power-up progress of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Uninitialized,
    Resetting,
    ConfiguringMode,
    SleepingOut,
    Ready,
}

/// One entry of a controller init table: command, parameters, and the
/// delay the controller needs before it accepts the next command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStep {
    pub command: u8,
    pub data: &'static [u8],
    pub delay_ms: u16,
}

impl InitStep {
    pub const fn new(command: u8, data: &'static [u8], delay_ms: u16) -> Self {
        Self {
            command,
            data,
            delay_ms,
        }
    }
}

const fn step(command: Instruction, data: &'static [u8], delay_ms: u16) -> InitStep {
    InitStep::new(command as u8, data, delay_ms)
}

/// ST7789V power-up sequence for 240x240 / 240x320 IPS modules.
pub const ST7789_INIT: &[InitStep] = &[
    step(Instruction::SoftwareReset, &[], 150),
    step(Instruction::PixelFormatSet, &[0x55], 10), // 16-bit color
    step(Instruction::MemoryAccessControl, &[0x00], 0),
    step(Instruction::PorchControl, &[0x0C, 0x0C, 0x00, 0x33, 0x33], 0),
    step(Instruction::GateControl, &[0x35], 0),
    step(Instruction::VcomSetting, &[0x19], 0),
    step(Instruction::LcmControl, &[0x2C], 0),
    step(Instruction::VdvVrhEnable, &[0x01], 0),
    step(Instruction::VrhSet, &[0x12], 0),
    step(Instruction::VdvSet, &[0x20], 0),
    step(Instruction::FrameRateControl, &[0x0F], 0), // 60 Hz
    step(Instruction::PowerControl1, &[0xA4, 0xA1], 0),
    step(
        Instruction::PositiveGamma,
        &[
            0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
        ],
        0,
    ),
    step(
        Instruction::NegativeGamma,
        &[
            0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
        ],
        0,
    ),
    step(Instruction::SleepOut, &[], 120),
    step(Instruction::NormalDisplayOn, &[], 10),
    step(Instruction::DisplayOn, &[], 20),
];

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
    /// Reset the panel and run the configured init table.
    ///
    /// Drawing through the bus is rejected until this returns `Ok`.
    pub async fn init(&mut self) -> Result<(), Error<E>> {
        self.state = State::Resetting;
        self.reset().await?;

        self.state = State::ConfiguringMode;
        let sequence = self.config.init_sequence;
        for step in sequence {
            if step.command == Instruction::SleepOut as u8 {
                self.state = State::SleepingOut;
            }
            trace!("init command {=u8:#x}", step.command);
            self.bus.send(step.command, step.data).await?;
            if step.delay_ms > 0 {
                TIMER::delay_ms(step.delay_ms as u64).await;
            }
        }

        let inversion = if self.config.inverted {
            Instruction::DisplayInversionOn
        } else {
            Instruction::DisplayInversionOff
        };
        self.bus.write_command(inversion as u8).await?;
        self.write_orientation(self.config.orientation).await?;
        self.bl.set_high().map_err(Error::Pin)?;

        self.state = State::Ready;
        debug!("display ready {=u16}x{=u16}", self.width, self.height);
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), Error<E>> {
        self.rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(10).await;
        self.rst.set_low().map_err(Error::Pin)?;
        TIMER::delay_ms(10).await;
        self.rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(120).await; // Wait for reset to complete

        Ok(())
    }

    pub async fn display_on(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bus.write_command(Instruction::DisplayOn as u8).await
    }

    pub async fn display_off(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bus.write_command(Instruction::DisplayOff as u8).await
    }

    pub async fn inversion_on(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bus
            .write_command(Instruction::DisplayInversionOn as u8)
            .await
    }

    pub async fn inversion_off(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bus
            .write_command(Instruction::DisplayInversionOff as u8)
            .await
    }

    pub fn backlight_on(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bl.set_high().map_err(Error::Pin)
    }

    pub fn backlight_off(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.bl.set_low().map_err(Error::Pin)
    }

    /// Define the hardware scroll region: `top_fixed` and `bottom_fixed` rows
    /// stay put, the rows in between scroll.
    pub async fn set_scroll_area(
        &mut self,
        top_fixed: u16,
        bottom_fixed: u16,
    ) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        let fixed = top_fixed
            .checked_add(bottom_fixed)
            .filter(|&rows| rows <= GRAM_HEIGHT)
            .ok_or(Error::InvalidArgument)?;
        let [t_hi, t_lo] = top_fixed.to_be_bytes();
        let [s_hi, s_lo] = (GRAM_HEIGHT - fixed).to_be_bytes();
        let [b_hi, b_lo] = bottom_fixed.to_be_bytes();
        self.bus
            .send(
                Instruction::VerticalScrollDefinition as u8,
                &[t_hi, t_lo, s_hi, s_lo, b_hi, b_lo],
            )
            .await
    }

    /// Select the RAM row shown at the top of the scroll region.
    pub async fn set_scroll_start(&mut self, line: u16) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        if line >= GRAM_HEIGHT {
            return Err(Error::InvalidArgument);
        }
        self.bus
            .send(Instruction::VerticalScrollStart as u8, &line.to_be_bytes())
            .await
    }

    pub async fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.write_orientation(orientation).await
    }

    async fn write_orientation(&mut self, orientation: Orientation) -> Result<(), Error<E>> {
        self.bus
            .send(
                Instruction::MemoryAccessControl as u8,
                &[orientation.madctl(self.config.rgb)],
            )
            .await?;

        let config = &self.config;
        if orientation.is_swapped() {
            self.width = config.height;
            self.height = config.width;
            self.dx = config.dy;
            self.dy = config.dx;
        } else {
            self.width = config.width;
            self.height = config.height;
            self.dx = config.dx;
            self.dy = config.dy;
        }
        self.orientation = orientation;
        debug!("orientation {=u16} deg", orientation.degrees());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTimer, block_on, config, direct, raw_display};
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn init_walks_table_then_orientation() {
        let (mut display, wire) = raw_display(config(240, 240));
        assert_eq!(display.state(), State::Uninitialized);
        block_on(display.init()).unwrap();

        let mut expected: Vec<u8> = ST7789_INIT.iter().map(|s| s.command).collect();
        expected.push(0x21);
        expected.push(0x36);
        assert_eq!(wire.commands(), expected);

        let frames = wire.frames();
        assert_eq!(frames[1], (0x3A, vec![0x55]));
        assert_eq!(frames.last().unwrap(), &(0x36, vec![0x00]));
        assert_eq!(display.state(), State::Ready);
        assert!(wire.backlight());
    }

    #[test]
    fn init_honors_every_post_delay() {
        let (mut display, _wire) = raw_display(config(240, 240));
        MockTimer::take();
        block_on(display.init()).unwrap();

        let mut expected = vec![10, 10, 120];
        expected.extend(
            ST7789_INIT
                .iter()
                .filter(|s| s.delay_ms > 0)
                .map(|s| s.delay_ms as u64),
        );
        assert_eq!(MockTimer::take(), expected);
    }

    #[test]
    fn failed_init_never_reaches_ready() {
        let (mut display, wire) = raw_display(config(240, 240));
        // SWRESET, COLMOD cmd, COLMOD data, MADCTL cmd...
        wire.fail_at(3);
        let result = block_on(display.init());
        assert!(matches!(result, Err(Error::Comm(_))));
        assert_eq!(display.state(), State::ConfiguringMode);
        assert!(matches!(
            block_on(display.display_on()),
            Err(Error::NotReady)
        ));
    }

    #[test]
    fn failure_after_sleep_out_is_observable() {
        let (mut display, wire) = raw_display(config(240, 240));
        let before_sleep_out: usize = ST7789_INIT
            .iter()
            .take_while(|s| s.command != Instruction::SleepOut as u8)
            .map(|s| 1 + usize::from(!s.data.is_empty()))
            .sum();
        // SLPOUT itself goes out, the next command fails
        wire.fail_at(before_sleep_out + 1);
        let result = block_on(display.init());
        assert!(matches!(result, Err(Error::Comm(_))));
        assert_eq!(display.state(), State::SleepingOut);
        assert_eq!(wire.commands().last(), Some(&0x11));

        block_on(display.init()).unwrap();
        assert_eq!(display.state(), State::Ready);
    }

    #[test]
    fn alternate_table_replaces_sequence() {
        const SHORT: &[InitStep] = &[
            InitStep::new(0x01, &[], 5),
            InitStep::new(0x11, &[], 7),
            InitStep::new(0x29, &[], 0),
        ];
        let mut cfg = config(128, 160);
        cfg.init_sequence = SHORT;
        cfg.inverted = false;
        let (mut display, wire) = raw_display(cfg);
        MockTimer::take();
        block_on(display.init()).unwrap();
        assert_eq!(wire.commands(), vec![0x01, 0x11, 0x29, 0x20, 0x36]);
        assert_eq!(MockTimer::take(), vec![10, 10, 120, 5, 7]);
    }

    #[test]
    fn toggles_require_ready() {
        let (mut display, wire) = raw_display(config(240, 240));
        assert!(matches!(block_on(display.inversion_on()), Err(Error::NotReady)));
        assert!(matches!(display.backlight_on(), Err(Error::NotReady)));
        assert!(wire.frames().is_empty());
    }

    #[test]
    fn toggles_map_to_single_commands() {
        let (mut display, wire) = direct(240, 240);
        block_on(display.display_off()).unwrap();
        block_on(display.display_on()).unwrap();
        block_on(display.inversion_off()).unwrap();
        block_on(display.inversion_on()).unwrap();
        assert_eq!(wire.commands(), vec![0x28, 0x29, 0x20, 0x21]);

        display.backlight_off().unwrap();
        assert!(!wire.backlight());
        display.backlight_on().unwrap();
        assert!(wire.backlight());
    }

    #[test]
    fn orientation_swaps_drawable_size() {
        let (mut display, wire) = direct(240, 320);
        block_on(display.set_orientation(Orientation::Deg90)).unwrap();
        assert_eq!((display.width(), display.height()), (320, 240));
        assert_eq!(wire.frames(), vec![(0x36, vec![0x60])]);

        block_on(display.set_orientation(Orientation::Deg180)).unwrap();
        assert_eq!((display.width(), display.height()), (240, 320));
        block_on(display.set_orientation(Orientation::Deg270)).unwrap();
        assert_eq!((display.width(), display.height()), (320, 240));
        assert_eq!(display.orientation(), Orientation::Deg270);
    }

    #[test]
    fn bgr_panels_set_order_bit() {
        assert_eq!(Orientation::Deg0.madctl(false), 0x08);
        assert_eq!(Orientation::Deg180.madctl(true), 0xC0);
        assert_eq!(Orientation::try_from(270), Ok(Orientation::Deg270));
        assert!(Orientation::try_from(45).is_err());
    }

    #[test]
    fn scroll_area_splits_gram_rows() {
        let (mut display, wire) = direct(240, 240);
        block_on(display.set_scroll_area(20, 40)).unwrap();
        block_on(display.set_scroll_start(100)).unwrap();
        assert_eq!(
            wire.frames(),
            vec![
                (0x33, vec![0x00, 20, 0x01, 0x04, 0x00, 40]),
                (0x37, vec![0x00, 100]),
            ]
        );
        assert!(matches!(
            block_on(display.set_scroll_area(200, 200)),
            Err(Error::InvalidArgument)
        ));
        assert!(matches!(
            block_on(display.set_scroll_start(320)),
            Err(Error::InvalidArgument)
        ));
    }
}
