//! RP2040 HAL for the bit-link firmware
//!
//! Implements the `bitlink-hal` traits on Embassy's RP2040 GPIO driver:
//!
//! - [`FlexLines`]: the signal/data pair as two bidirectional `Flex` pins,
//!   with an async wait for the strobe edge
//! - [`LedPin`]: status LED output
//! - [`PinBank`]: GPIOs taken by number from the configuration

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod lines;
pub mod pins;

pub use gpio::LedPin;
pub use lines::FlexLines;
pub use pins::{PinBank, PinError};
