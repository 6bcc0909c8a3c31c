//! Link activity indicator

use bitlink_hal::OutputPin;

/// Optional status LED
///
/// Without a pin every operation is a no-op, so callers never branch on
/// whether the board has one.
pub struct StatusLed<P> {
    pin: Option<P>,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self { pin: Some(pin) }
    }

    pub fn disabled() -> Self {
        Self { pin: None }
    }

    pub fn set_active(&mut self, on: bool) {
        if let Some(pin) = self.pin.as_mut() {
            pin.set_state(on);
        }
    }

    /// Flip the LED, once per received frame
    pub fn toggle(&mut self) {
        if let Some(pin) = self.pin.as_mut() {
            pin.toggle();
        }
    }

    pub fn is_lit(&self) -> bool {
        self.pin.as_ref().map(|p| p.is_set_high()).unwrap_or(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.pin.is_some()
    }
}
