//! Bit-link lines on two `Flex` GPIOs

use core::future;

use embassy_rp::gpio::{AnyPin, Flex, Level, Pull};
use embassy_rp::Peri;

use bitlink_hal::{LineMode, LinkLines};

/// Signal and data lines of one link port
///
/// Edge detection is a software gate: while disarmed,
/// [`FlexLines::wait_for_strobe`] never completes, so no edge of our own
/// transmission reaches the sampler.
pub struct FlexLines<'d> {
    signal: Flex<'d>,
    data: Flex<'d>,
    signal_pull: Pull,
    data_pull: Pull,
    armed: bool,
}

impl<'d> FlexLines<'d> {
    /// Take both pins as inputs with the given bias; edges start disarmed
    pub fn new(
        signal: Peri<'d, AnyPin>,
        data: Peri<'d, AnyPin>,
        signal_pull: Pull,
        data_pull: Pull,
    ) -> Self {
        let mut lines = Self {
            signal: Flex::new(signal),
            data: Flex::new(data),
            signal_pull,
            data_pull,
            armed: false,
        };
        lines.set_mode(LineMode::Input);
        lines
    }

    /// Wait for the next rising edge on the signal line
    ///
    /// Stays pending while edge detection is disarmed.
    pub async fn wait_for_strobe(&mut self) {
        if !self.armed {
            future::pending::<()>().await;
        }
        self.signal.wait_for_rising_edge().await;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl LinkLines for FlexLines<'_> {
    fn set_mode(&mut self, mode: LineMode) {
        match mode {
            LineMode::Input => {
                self.signal.set_as_input();
                self.data.set_as_input();
                self.signal.set_pull(self.signal_pull);
                self.data.set_pull(self.data_pull);
            }
            LineMode::Output => {
                // Latch low before enabling the drivers so the strobe never glitches high
                self.signal.set_level(Level::Low);
                self.data.set_level(Level::Low);
                self.signal.set_pull(Pull::None);
                self.data.set_pull(Pull::None);
                self.signal.set_as_output();
                self.data.set_as_output();
            }
        }
    }

    fn set_edge_detection(&mut self, enabled: bool) {
        self.armed = enabled;
    }

    fn set_signal(&mut self, high: bool) {
        self.signal.set_level(Level::from(high));
    }

    fn set_data(&mut self, high: bool) {
        self.data.set_level(Level::from(high));
    }

    fn read_data(&self) -> bool {
        self.data.is_high()
    }
}
