//! Configuration type definitions

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bitlink_protocol::COORDINATOR_ID;

use crate::link::LinkTiming;
use crate::roster::{Roster, RosterError, MAX_DEVICES};

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value of the wrong type or out of range
    InvalidValue,
    /// Key not valid in its section
    UnknownKey,
    /// Pin string not of the form `gpioN`
    InvalidPin,
    /// Signal, data and LED pins overlap
    PinConflict,
    /// More roster entries than [`MAX_DEVICES`]
    TooManyDevices,
    /// Timing fails [`LinkTiming::is_valid`]
    InvalidTiming,
    /// Roster name not in the device catalogue
    UnknownDevice,
}

/// GPIO pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            pull_up: false,
        }
    }

    pub const fn with_pullup(pin: u8) -> Self {
        Self { pin, pull_up: true }
    }
}

/// One device's link settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Receive-filter address; 0 is the coordinator
    pub own_id: u16,
    /// Strobe line
    pub signal_pin: PinConfig,
    /// Data line
    pub data_pin: PinConfig,
    /// Activity LED, toggled per received frame
    pub led_pin: Option<PinConfig>,
    pub timing: LinkTiming,
    /// Devices the coordinator polls
    pub devices: Vec<u16, MAX_DEVICES>,
    /// How long the coordinator waits for an answer to a request
    pub reply_window_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            own_id: COORDINATOR_ID,
            signal_pin: PinConfig::new(14),
            data_pin: PinConfig::new(15),
            led_pin: Some(PinConfig::new(25)),
            timing: LinkTiming::DEFAULT,
            devices: Vec::new(),
            reply_window_ms: 500,
        }
    }
}

impl LinkConfig {
    pub fn is_coordinator(&self) -> bool {
        self.own_id == COORDINATOR_ID
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timing.is_valid() {
            return Err(ConfigError::InvalidTiming);
        }

        let signal = self.signal_pin.pin;
        let data = self.data_pin.pin;
        if signal == data {
            return Err(ConfigError::PinConflict);
        }
        if let Some(led) = self.led_pin {
            if led.pin == signal || led.pin == data {
                return Err(ConfigError::PinConflict);
            }
        }

        if self.reply_window_ms == 0 {
            return Err(ConfigError::InvalidValue);
        }

        for (i, &id) in self.devices.iter().enumerate() {
            if id == COORDINATOR_ID || self.devices[..i].contains(&id) {
                return Err(ConfigError::InvalidValue);
            }
        }

        Ok(())
    }

    /// Coordinator roster for the configured devices
    pub fn roster(&self) -> Result<Roster, RosterError> {
        let mut roster = Roster::new(self.reply_window_ms);
        for &id in &self.devices {
            roster.add(id)?;
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_coordinator());
        assert!(config.roster().unwrap().devices().is_empty());
    }

    #[test]
    fn test_pin_conflict() {
        let mut config = LinkConfig::default();
        config.data_pin = config.signal_pin;
        assert_eq!(config.validate(), Err(ConfigError::PinConflict));

        let mut config = LinkConfig::default();
        config.led_pin = Some(PinConfig::with_pullup(15));
        assert_eq!(config.validate(), Err(ConfigError::PinConflict));

        config.led_pin = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timing() {
        let mut config = LinkConfig::default();
        config.timing.frame_gap_us = 100;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }

    #[test]
    fn test_roster_entries() {
        let mut config = LinkConfig::default();
        config.devices.push(1).unwrap();
        config.devices.push(7).unwrap();
        let roster = config.roster().unwrap();
        assert_eq!(roster.devices().len(), 2);
        assert_eq!(roster.reply_window_ms(), 500);

        config.devices.push(1).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidValue));
        assert_eq!(config.roster().unwrap_err(), RosterError::Duplicate);
    }
}
