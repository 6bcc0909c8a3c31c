//! Plain GPIO outputs

use embassy_rp::gpio::{AnyPin, Level, Output, Pull};
use embassy_rp::Peri;

use bitlink_core::PinConfig;
use bitlink_hal::OutputPin;

/// Status LED on a push-pull output, initially off
pub struct LedPin<'d> {
    output: Output<'d>,
}

impl<'d> LedPin<'d> {
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        Self {
            output: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for LedPin<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}

/// Input bias for a configured pin
pub fn pull_for(config: &PinConfig) -> Pull {
    if config.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}
