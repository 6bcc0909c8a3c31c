//! Bit-link transport internals
//!
//! Two execution contexts touch the link:
//!
//! - the **edge context** (strobe interrupt or highest-priority task) runs
//!   only [`BitSampler::on_edge`]: bounded time, no allocation, no locks
//! - the **background context** runs [`Reassembler::service`] and
//!   consumers, and is the only side that takes the [`LinkQueue`] lock
//!
//! [`BitTransmitter`] owns the lines and suspends the edge context for the
//! duration of a transmission.

pub mod filter;
pub mod queue;
pub mod reassembler;
pub mod sampler;
pub mod state;
pub mod timing;
pub mod transmitter;

pub use queue::LinkQueue;
pub use reassembler::{Reassembler, Reassembly};
pub use sampler::{BitSampler, SampleOutcome};
pub use state::{LinkState, LinkStats};
pub use timing::LinkTiming;
pub use transmitter::{BitTransmitter, LinkMode};
