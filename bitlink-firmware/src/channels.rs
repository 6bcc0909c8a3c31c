//! Shared link state and inter-task channels
//!
//! The receive state and frame queue are the only statics the transport
//! needs; everything else hands work between tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use bitlink_core::{LinkQueue, LinkState};
use bitlink_protocol::{Path, Value};

/// Accepted frames buffered between the reassembler and the consumer
pub const QUEUE_DEPTH: usize = 16;

/// Channel capacity for outbound frames
const TX_CHANNEL_SIZE: usize = 4;

/// Receive state written by the link task, drained by the reassembly task
pub static LINK: LinkState = LinkState::new();

/// Accepted frames
pub static QUEUE: LinkQueue<QUEUE_DEPTH> = LinkQueue::new();

/// Frame to transmit
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outbound {
    /// Own telemetry value
    Value { path: Path, value: Value },
    /// Ask a device to send its data
    Request { target: u16 },
}

/// Frames for the link task to send
pub static TX_REQUESTS: Channel<CriticalSectionRawMutex, Outbound, TX_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the last bit of a frame was sampled
pub static FRAME_COMPLETE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal that a frame was accepted into [`QUEUE`]
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
