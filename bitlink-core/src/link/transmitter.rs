//! Half-duplex bit transmitter
//!
//! Owns the link lines. Listening and transmitting are mutually exclusive
//! on the shared pair, modelled as explicit mode transitions:
//!
//! ```text
//!              enter: edges off → suspend sampler → lines out
//! Receiving ─────────────────────────────────────────────▶ Transmitting
//!     ▲                                                        │
//!     └────────────────────────────────────────────────────────┘
//!              exit: lines in → resume sampler → edges on
//! ```

use embedded_hal::delay::DelayNs;

use bitlink_hal::{LineMode, LinkLines};
use bitlink_protocol::Frame;

use super::state::{Counter, LinkState};
use super::timing::LinkTiming;

/// Direction of the link port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Lines are inputs, strobe edges are sampled
    Receiving,
    /// Lines are driven by this device, sampling suspended
    Transmitting,
}

/// Bit-banged frame transmitter
pub struct BitTransmitter<L, D> {
    lines: L,
    delay: D,
    timing: LinkTiming,
    mode: LinkMode,
}

impl<L: LinkLines, D: DelayNs> BitTransmitter<L, D> {
    /// Wrap the lines; they are not touched until [`BitTransmitter::arm`]
    pub fn new(lines: L, delay: D, timing: LinkTiming) -> Self {
        Self {
            lines,
            delay,
            timing,
            mode: LinkMode::Receiving,
        }
    }

    /// Put the lines in receive mode and arm strobe-edge detection
    pub fn arm(&mut self) {
        self.lines.set_mode(LineMode::Input);
        self.lines.set_edge_detection(true);
        self.mode = LinkMode::Receiving;
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn timing(&self) -> &LinkTiming {
        &self.timing
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    /// Send one frame; blocks for [`LinkTiming::frame_duration_us`]
    pub fn transmit(&mut self, state: &LinkState, frame: &Frame) {
        self.transmit_bytes(state, &frame.to_bytes());
    }

    /// Send raw bytes, LSB first, followed by the inter-frame gap
    ///
    /// Any partially received frame is abandoned when transmission begins.
    pub fn transmit_bytes(&mut self, state: &LinkState, bytes: &[u8]) {
        self.enter_transmit(state);

        for &byte in bytes {
            for bit in 0..8 {
                self.send_bit((byte >> bit) & 1 == 1);
            }
        }

        self.lines.set_data(false);
        self.delay.delay_us(self.timing.frame_gap_us);

        self.exit_transmit(state);
        state.bump(Counter::Sent);
    }

    fn enter_transmit(&mut self, state: &LinkState) {
        self.lines.set_edge_detection(false);
        state.suspend();
        self.lines.set_mode(LineMode::Output);
        self.lines.set_signal(false);
        self.lines.set_data(false);
        self.mode = LinkMode::Transmitting;
    }

    fn exit_transmit(&mut self, state: &LinkState) {
        self.lines.set_mode(LineMode::Input);
        state.resume();
        self.lines.set_edge_detection(true);
        self.mode = LinkMode::Receiving;
    }

    fn send_bit(&mut self, bit: bool) {
        self.lines.set_data(bit);
        self.delay.delay_us(self.timing.setup_us);
        self.lines.set_signal(true);
        self.delay.delay_us(self.timing.strobe_us);
        self.lines.set_signal(false);
        self.delay.delay_us(self.timing.hold_us);
    }
}
