//! Bit-link Telemetry Frame Protocol
//!
//! This crate defines the on-wire record exchanged between two devices over
//! the two-line bit-link. Every frame has the same fixed size so that the
//! receiver can detect completion by counting bits, and the address field
//! comes first so the receive filter can be evaluated from the header alone.
//!
//! # Frame Layout
//!
//! ```text
//! ┌──────────────┬──────┬──────────────────┬─────────┐
//! │ RECIPIENT_ID │ KIND │ PATH             │ VALUE   │
//! │ 2B (LE)      │ 1B   │ 32B, NUL-padded  │ 8B (LE) │
//! └──────────────┴──────┴──────────────────┴─────────┘
//! ```
//!
//! Bytes are transmitted in layout order, each byte least-significant bit
//! first. There is no checksum: the link is best-effort and a corrupted
//! frame is either filtered out or delivered as-is.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod device;
pub mod frame;
pub mod path;
pub mod value;

pub use device::DeviceId;
pub use frame::{
    Frame, FrameError, FrameHeader, Payload, COORDINATOR_ID, FRAME_BITS, FRAME_SIZE, HEADER_SIZE,
};
pub use path::{Path, PATH_SIZE};
pub use value::{Kind, Value, VALUE_SIZE};
