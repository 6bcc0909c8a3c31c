//! Frame reassembly
//!
//! Runs in the background context, either periodically (at least twice per
//! bit period) or when the sampler reports a complete frame. It is the only
//! code that validates frames, allocates queue slots or takes the queue
//! lock, which keeps all of that out of the edge context.

use bitlink_protocol::{Frame, FrameHeader, FRAME_BITS};

use super::filter;
use super::queue::LinkQueue;
use super::state::{Counter, LinkState};
use super::timing::LinkTiming;

/// What a reassembly pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reassembly {
    /// Nothing received
    Idle,
    /// A frame is being sampled
    Receiving,
    /// A frame passed the filter and was queued
    Accepted,
    /// A complete frame failed the filter or kind check
    Rejected,
    /// A frame passed the filter but the queue was full
    Dropped,
    /// A partial frame went stale and was discarded
    Abandoned,
}

/// Background-context consumer of a [`LinkState`]
pub struct Reassembler<'a, const N: usize> {
    state: &'a LinkState,
    queue: &'a LinkQueue<N>,
    stale_after_us: u32,
}

impl<'a, const N: usize> Reassembler<'a, N> {
    pub fn new(state: &'a LinkState, queue: &'a LinkQueue<N>, timing: &LinkTiming) -> Self {
        Self {
            state,
            queue,
            stale_after_us: timing.frame_gap_us,
        }
    }

    /// Inspect the receive state once
    ///
    /// A complete buffer is filtered, decoded and queued or discarded; in
    /// every case the buffer is zeroed and the offset returns to 0. A
    /// partial buffer whose last edge is older than the frame gap is
    /// abandoned the same way.
    pub fn service(&self, now_us: u32) -> Reassembly {
        let offset = self.state.bit_offset();
        if offset >= FRAME_BITS {
            let bytes = self.state.snapshot();
            let outcome = self.complete(&bytes);
            self.state.reset();
            return outcome;
        }

        if offset == 0 {
            return Reassembly::Idle;
        }

        let silent_for = now_us.wrapping_sub(self.state.last_edge_us());
        if silent_for > self.stale_after_us {
            self.state.reset();
            self.state.bump(Counter::Abandoned);
            return Reassembly::Abandoned;
        }

        Reassembly::Receiving
    }

    fn complete(&self, bytes: &[u8]) -> Reassembly {
        let accepted = FrameHeader::peek(bytes)
            .map(|header| filter::accepts(self.state.own_id(), &header))
            .unwrap_or(false);
        if !accepted {
            self.state.bump(Counter::Rejected);
            return Reassembly::Rejected;
        }

        let frame = match Frame::decode(bytes) {
            Ok(frame) => frame,
            Err(_) => {
                self.state.bump(Counter::Rejected);
                return Reassembly::Rejected;
            }
        };

        match self.queue.push(frame) {
            Ok(()) => {
                self.state.bump(Counter::Accepted);
                Reassembly::Accepted
            }
            Err(_) => {
                self.state.bump(Counter::Dropped);
                Reassembly::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::sampler::BitSampler;
    use bitlink_protocol::{Kind, FRAME_SIZE};

    fn feed(state: &LinkState, bytes: &[u8], now_us: u32) {
        let sampler = BitSampler::new(state);
        for &byte in bytes {
            for bit in 0..8 {
                sampler.on_edge((byte >> bit) & 1 == 1, now_us);
            }
        }
    }

    fn setup(own_id: u16) -> (LinkState, LinkQueue<2>) {
        let state = LinkState::new();
        state.set_own_id(own_id);
        (state, LinkQueue::new())
    }

    #[test]
    fn test_idle() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        assert_eq!(reassembler.service(0), Reassembly::Idle);
    }

    #[test]
    fn test_accepts_value_on_coordinator() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        let frame = Frame::value(4, "/dht22/temperature", 23.5f32);
        feed(&state, &frame.to_bytes(), 100);

        assert_eq!(reassembler.service(200), Reassembly::Accepted);
        assert!(state.is_idle());
        assert_eq!(state.snapshot(), [0u8; FRAME_SIZE]);
        assert_eq!(queue.pop(), Some(frame));
        assert_eq!(state.stats().accepted, 1);
    }

    #[test]
    fn test_rejects_request_for_other_device() {
        let (state, queue) = setup(3);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        feed(&state, &Frame::request(7).to_bytes(), 0);

        assert_eq!(reassembler.service(0), Reassembly::Rejected);
        assert!(state.is_idle());
        assert!(queue.is_empty());
        assert_eq!(state.stats().rejected, 1);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        let mut bytes = Frame::value(1, "/x", 1u64).to_bytes();
        bytes[2] = 0x33;
        assert_eq!(Kind::from_byte(bytes[2]), Kind::Unknown);
        feed(&state, &bytes, 0);

        assert_eq!(reassembler.service(0), Reassembly::Rejected);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_partial_frame_waits_then_goes_stale() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        feed(&state, &[0xAB, 0xCD], 1_000);

        assert_eq!(reassembler.service(1_000 + 5_000), Reassembly::Receiving);
        assert_eq!(state.bit_offset(), 16);

        assert_eq!(reassembler.service(1_000 + 5_001), Reassembly::Abandoned);
        assert!(state.is_idle());
        assert_eq!(state.snapshot(), [0u8; FRAME_SIZE]);
        assert_eq!(state.stats().abandoned, 1);
    }

    #[test]
    fn test_stale_check_handles_timer_wrap() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);
        feed(&state, &[0x01], u32::MAX - 10);

        assert_eq!(reassembler.service(100), Reassembly::Receiving);
        assert_eq!(reassembler.service(6_000), Reassembly::Abandoned);
    }

    #[test]
    fn test_full_queue_drops() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);

        for i in 0..3u64 {
            feed(&state, &Frame::value(1, "/n", i).to_bytes(), 0);
            let expected = if i < 2 {
                Reassembly::Accepted
            } else {
                Reassembly::Dropped
            };
            assert_eq!(reassembler.service(0), expected);
        }

        assert!(state.is_idle());
        assert_eq!(state.stats().dropped, 1);
        assert_eq!(queue.pop().unwrap().as_value(), Some(0u64.into()));
    }

    #[test]
    fn test_overrun_then_next_frame_clean() {
        let (state, queue) = setup(0);
        let reassembler = Reassembler::new(&state, &queue, &LinkTiming::DEFAULT);

        // A frame completes, then the next sender starts before reassembly ran
        feed(&state, &Frame::request(9).to_bytes(), 0);
        feed(&state, &[0xFF; 4], 0);
        assert_eq!(state.stats().overruns, 1);

        assert_eq!(reassembler.service(0), Reassembly::Rejected);
        assert!(state.is_idle());

        let frame = Frame::value(2, "/after", -5i64);
        feed(&state, &frame.to_bytes(), 0);
        assert_eq!(reassembler.service(0), Reassembly::Accepted);
        assert_eq!(queue.pop(), Some(frame));
    }
}
