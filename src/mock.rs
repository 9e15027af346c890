//! Recording doubles for the SPI device, control pins and timer.

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::pixelcolor::RgbColor;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{self, ErrorKind, Operation};
use std::boxed::Box;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::{Buffered, Config, Direct, St7789};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(u8),
    Data(Vec<u8>),
}

#[derive(Default)]
struct State {
    dc_high: bool,
    backlight: bool,
    events: Vec<Event>,
    writes: usize,
    fail_at: Option<usize>,
}

/// Shared view of everything that went over the wire.
#[derive(Clone, Default)]
pub struct Wire(Rc<RefCell<State>>);

impl Wire {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// Commands with their data bytes concatenated.
    pub fn frames(&self) -> Vec<(u8, Vec<u8>)> {
        let mut frames: Vec<(u8, Vec<u8>)> = Vec::new();
        for event in self.0.borrow().events.iter() {
            match event {
                Event::Command(cmd) => frames.push((*cmd, Vec::new())),
                Event::Data(bytes) => {
                    if let Some((_, data)) = frames.last_mut() {
                        data.extend_from_slice(bytes);
                    }
                }
            }
        }
        frames
    }

    pub fn commands(&self) -> Vec<u8> {
        self.frames().into_iter().map(|(cmd, _)| cmd).collect()
    }

    /// Length of every data transaction, in order.
    pub fn data_writes(&self) -> Vec<usize> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Data(bytes) => Some(bytes.len()),
                Event::Command(_) => None,
            })
            .collect()
    }

    /// Every byte sent with DC high, command parameters included.
    pub fn data_bytes(&self) -> Vec<u8> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Data(bytes) => Some(bytes.clone()),
                Event::Command(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Bytes that followed a memory write command, i.e. pixel data only.
    pub fn pixel_bytes(&self) -> Vec<u8> {
        self.frames()
            .into_iter()
            .filter(|(cmd, _)| *cmd == 0x2C)
            .flat_map(|(_, data)| data)
            .collect()
    }

    /// Column/row windows addressed so far, as `(x1, y1, x2, y2)`.
    pub fn windows(&self) -> Vec<(u16, u16, u16, u16)> {
        let frames = self.frames();
        let mut windows = Vec::new();
        for pair in frames.windows(2) {
            if let [(0x2A, cols), (0x2B, rows)] = pair {
                let (cols, rows) = (cols.as_slice(), rows.as_slice());
                windows.push((word(cols, 0), word(rows, 0), word(cols, 2), word(rows, 2)));
            }
        }
        windows
    }

    /// Make the `n`th SPI write (0-based) fail.
    pub fn fail_at(&self, n: usize) {
        let mut state = self.0.borrow_mut();
        state.fail_at = Some(state.writes + n);
    }

    pub fn backlight(&self) -> bool {
        self.0.borrow().backlight
    }

    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }
}

fn word(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl spi::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockSpi(Wire);

impl MockSpi {
    fn record(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), MockError> {
        let mut state = self.0.0.borrow_mut();
        for operation in operations.iter() {
            if let Operation::Write(bytes) = operation {
                if state.fail_at == Some(state.writes) {
                    state.fail_at = None;
                    return Err(MockError);
                }
                state.writes += 1;
                if state.dc_high {
                    state.events.push(Event::Data(bytes.to_vec()));
                } else {
                    for &cmd in bytes.iter() {
                        state.events.push(Event::Command(cmd));
                    }
                }
            }
        }
        Ok(())
    }
}

impl spi::ErrorType for MockSpi {
    type Error = MockError;
}

impl spi::SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), MockError> {
        self.record(operations)
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), MockError> {
        self.record(operations)
    }
}

pub struct MockDc(Wire);

impl PinErrorType for MockDc {
    type Error = Infallible;
}

impl OutputPin for MockDc {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.0.borrow_mut().dc_high = true;
        Ok(())
    }
}

pub struct MockBacklight(pub Wire);

impl PinErrorType for MockBacklight {
    type Error = Infallible;
}

impl OutputPin for MockBacklight {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.0.borrow_mut().backlight = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.0.borrow_mut().backlight = true;
        Ok(())
    }
}

pub struct MockPin;

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

std::thread_local! {
    static DELAYS: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Records every requested delay instead of sleeping.
pub struct MockTimer;

impl MockTimer {
    pub fn take() -> Vec<u64> {
        DELAYS.with(|delays| core::mem::take(&mut *delays.borrow_mut()))
    }
}

#[cfg(feature = "async")]
impl crate::Timer for MockTimer {
    async fn delay_ms(milliseconds: u64) {
        DELAYS.with(|delays| delays.borrow_mut().push(milliseconds));
    }
}

#[cfg(not(feature = "async"))]
impl crate::Timer for MockTimer {
    fn delay_ms(milliseconds: u64) {
        DELAYS.with(|delays| delays.borrow_mut().push(milliseconds));
    }
}

#[cfg(feature = "async")]
pub fn block_on<F: core::future::Future>(future: F) -> F::Output {
    embassy_futures::block_on(future)
}

#[cfg(not(feature = "async"))]
pub fn block_on<T>(value: T) -> T {
    value
}

pub fn wire() -> (MockSpi, MockDc, Wire) {
    let wire = Wire::default();
    (MockSpi(wire.clone()), MockDc(wire.clone()), wire)
}

pub type TestDisplay<MODE> =
    St7789<'static, MockSpi, MockDc, MockPin, MockBacklight, MockTimer, MODE>;

pub fn config(width: u16, height: u16) -> Config {
    Config {
        width,
        height,
        dx: 0,
        dy: 0,
        ..Config::default()
    }
}

fn staging() -> &'static mut [u8] {
    Box::leak(vec![0u8; 64].into_boxed_slice())
}

/// Constructed but not initialized.
pub fn raw_display(config: Config) -> (TestDisplay<Direct>, Wire) {
    let (spi, dc, wire) = wire();
    let backlight = MockBacklight(wire.clone());
    let display = St7789::new(config, spi, dc, MockPin, backlight, staging());
    (display, wire)
}

/// Initialized direct-mode display with an empty wire log.
pub fn direct(width: u16, height: u16) -> (TestDisplay<Direct>, Wire) {
    let (mut display, wire) = raw_display(config(width, height));
    block_on(display.init()).unwrap();
    wire.clear();
    MockTimer::take();
    (display, wire)
}

/// Initialized buffered display backed by a black frame.
pub fn buffered(width: u16, height: u16) -> (TestDisplay<Buffered<Vec<Rgb565>>>, Wire) {
    let (spi, dc, wire) = wire();
    let backlight = MockBacklight(wire.clone());
    let frame = vec![Rgb565::BLACK; width as usize * height as usize];
    let mut display = St7789::new_buffered(
        config(width, height),
        spi,
        dc,
        MockPin,
        backlight,
        staging(),
        frame,
    )
    .unwrap();
    block_on(display.init()).unwrap();
    wire.clear();
    MockTimer::take();
    (display, wire)
}
