//! Bit-link Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the bit-link transport needs from
//! a chip-specific HAL. The same link core then runs on any board that can
//! drive two GPIO lines and detect a rising edge on one of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (bitlink-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitlink-core (sampler, transmitter)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitlink-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (status LED)
//! - [`link::LinkLines`] - The signal/data line pair of the link

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod link;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use link::{LineMode, LinkLines};
