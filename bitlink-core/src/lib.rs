//! Board-agnostic core of the bit-link telemetry transport
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Receive state shared between the edge context and the background
//!   context (lock-free raw buffer and bit offset)
//! - Bit sampler, frame reassembler and address filter
//! - Bounded, lock-protected queue of accepted frames
//! - Half-duplex bit transmitter
//! - The [`Transport`] facade consumers call
//! - Coordinator polling policy ([`Roster`]) and status LED
//! - Link configuration and its parser
//!
//! # Data flow
//!
//! ```text
//! BitTransmitter ──▶ lines ──▶ BitSampler ──▶ LinkState ──▶ Reassembler ──▶ LinkQueue ──▶ poll()
//!   (sender)                   (edge ctx)     (raw bits)    (background)     (locked)     (consumer)
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod indicator;
pub mod link;
pub mod roster;
pub mod transport;

#[cfg(test)]
mod sim;

pub use config::{parse_config, ConfigError, LinkConfig, PinConfig};
pub use indicator::StatusLed;
pub use link::{
    BitSampler, BitTransmitter, LinkMode, LinkQueue, LinkState, LinkStats, LinkTiming,
    Reassembler, Reassembly, SampleOutcome,
};
pub use roster::{DeviceStatus, Roster, RosterError, RosterEvent};
pub use transport::{LinkReceiver, Transport};
