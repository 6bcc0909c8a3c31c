//! Transport facade
//!
//! The surface consumers use: configure the own address, send a typed value,
//! send a bare request and poll for received frames. The facade owns the
//! transmitter; the edge and background contexts reach the shared
//! [`LinkState`] through [`Transport::sample_edge`] (or a [`BitSampler`])
//! and [`Transport::reassembler`].

use embedded_hal::delay::DelayNs;

use bitlink_hal::LinkLines;
use bitlink_protocol::{Frame, Path, Value};

use crate::link::{
    BitSampler, BitTransmitter, LinkMode, LinkQueue, LinkState, LinkTiming, Reassembler,
    SampleOutcome,
};

/// Consumer-side handle on the queue of accepted frames
///
/// Cheap to copy; lets a task poll without owning the [`Transport`].
#[derive(Clone, Copy)]
pub struct LinkReceiver<'a, const N: usize> {
    queue: &'a LinkQueue<N>,
}

impl<'a, const N: usize> LinkReceiver<'a, N> {
    pub const fn new(queue: &'a LinkQueue<N>) -> Self {
        Self { queue }
    }

    /// Oldest accepted frame, if any. Never blocks.
    pub fn poll(&self) -> Option<Frame> {
        self.queue.pop()
    }

    /// Frames waiting to be polled
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// One device's end of a bit-link
pub struct Transport<'a, L, D, const N: usize> {
    state: &'a LinkState,
    queue: &'a LinkQueue<N>,
    tx: BitTransmitter<L, D>,
}

impl<'a, L: LinkLines, D: DelayNs, const N: usize> Transport<'a, L, D, N> {
    /// Build a transport over shared link state
    ///
    /// Reception stays disarmed until [`Transport::configure`].
    pub fn new(
        state: &'a LinkState,
        queue: &'a LinkQueue<N>,
        lines: L,
        delay: D,
        timing: LinkTiming,
    ) -> Self {
        Self {
            state,
            queue,
            tx: BitTransmitter::new(lines, delay, timing),
        }
    }

    /// Set the receive-filter address, clear receive state and arm reception
    ///
    /// Safe to call again; each call leaves the link idle with an empty
    /// queue.
    pub fn configure(&mut self, own_id: u16) {
        self.state.set_own_id(own_id);
        self.state.reset();
        self.queue.clear();
        self.tx.arm();
    }

    pub fn own_id(&self) -> u16 {
        self.state.own_id()
    }

    /// Transmit a value frame carrying this device's id
    ///
    /// Blocks for [`LinkTiming::frame_duration_us`].
    pub fn send(&mut self, path: impl Into<Path>, value: impl Into<Value>) {
        let frame = Frame::value(self.state.own_id(), path, value);
        self.tx.transmit(self.state, &frame);
    }

    /// Ask `target_id` to send its data
    pub fn send_request(&mut self, target_id: u16) {
        self.tx.transmit(self.state, &Frame::request(target_id));
    }

    /// Oldest accepted frame, if any. Never blocks.
    pub fn poll(&self) -> Option<Frame> {
        self.queue.pop()
    }

    /// Edge-context entry: sample the data line for one strobe edge
    pub fn sample_edge(&self, now_us: u32) -> SampleOutcome {
        let level = self.tx.lines().read_data();
        BitSampler::new(self.state).on_edge(level, now_us)
    }

    pub fn receiver(&self) -> LinkReceiver<'a, N> {
        LinkReceiver::new(self.queue)
    }

    /// Background-context reassembler for this link
    pub fn reassembler(&self) -> Reassembler<'a, N> {
        Reassembler::new(self.state, self.queue, self.tx.timing())
    }

    pub fn state(&self) -> &'a LinkState {
        self.state
    }

    pub fn timing(&self) -> &LinkTiming {
        self.tx.timing()
    }

    pub fn mode(&self) -> LinkMode {
        self.tx.mode()
    }

    pub fn lines(&self) -> &L {
        self.tx.lines()
    }

    pub fn lines_mut(&mut self) -> &mut L {
        self.tx.lines_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Reassembly;
    use crate::sim::{SimDelay, SimLines, Wire};
    use bitlink_hal::LineMode;
    use bitlink_protocol::{Payload, FRAME_SIZE};
    use proptest::prelude::*;

    type SimTransport<'a> = Transport<'a, SimLines<'a>, SimDelay<'a>, 4>;

    fn transport<'a>(
        wire: &'a Wire<'a>,
        state: &'a LinkState,
        queue: &'a LinkQueue<4>,
        own_id: u16,
    ) -> SimTransport<'a> {
        let mut t = Transport::new(
            state,
            queue,
            wire.attach(state),
            wire.delay(),
            LinkTiming::DEFAULT,
        );
        t.configure(own_id);
        t
    }

    #[test]
    fn test_value_round_trip() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut device = transport(&wire, &state_a, &queue_a, 4);
        let coordinator = transport(&wire, &state_b, &queue_b, 0);

        device.send("/dht22/temperature", 23.5f32);
        assert_eq!(
            coordinator.reassembler().service(wire.clock().now_us()),
            Reassembly::Accepted
        );

        let frame = coordinator.poll().unwrap();
        assert_eq!(frame.recipient_id, 4);
        assert_eq!(frame.path.as_str(), Some("/dht22/temperature"));
        assert_eq!(frame.payload, Payload::Value(Value::Float(23.5)));
        assert!(coordinator.poll().is_none());

        // The sender never hears itself
        assert!(state_a.is_idle());
        assert!(device.poll().is_none());
    }

    #[test]
    fn test_every_kind_round_trips() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut device = transport(&wire, &state_a, &queue_a, 6);
        let coordinator = transport(&wire, &state_b, &queue_b, 0);

        let values = [
            Value::Float(-0.25),
            Value::Double(1013.25),
            Value::Int64(i64::MIN),
            Value::Uint64(u64::MAX),
        ];
        for value in values {
            device.send("/sds011/pm25", value);
            coordinator.reassembler().service(wire.clock().now_us());
            let frame = coordinator.poll().unwrap();
            assert_eq!(frame.kind(), value.kind());
            assert_eq!(frame.as_value(), Some(value));
            assert_eq!(frame.path.as_str(), Some("/sds011/pm25"));
        }
    }

    #[test]
    fn test_request_address_filter() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut coordinator = transport(&wire, &state_a, &queue_a, 0);
        let device = transport(&wire, &state_b, &queue_b, 3);
        let now = || wire.clock().now_us();

        coordinator.send_request(7);
        assert_eq!(device.reassembler().service(now()), Reassembly::Rejected);
        assert!(device.poll().is_none());
        assert!(state_b.is_idle());

        coordinator.send_request(3);
        assert_eq!(device.reassembler().service(now()), Reassembly::Accepted);
        let frame = device.poll().unwrap();
        assert!(frame.is_request());
        assert_eq!(frame.recipient_id, 3);
    }

    #[test]
    fn test_values_ignored_by_devices() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut sender = transport(&wire, &state_a, &queue_a, 5);
        let listener = transport(&wire, &state_b, &queue_b, 5);

        sender.send("/battery/voltage", 3.7f64);
        assert_eq!(
            listener.reassembler().service(wire.clock().now_us()),
            Reassembly::Rejected
        );
        assert!(listener.poll().is_none());
    }

    #[test]
    fn test_fifo_order_across_frames() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut device = transport(&wire, &state_a, &queue_a, 2);
        let coordinator = transport(&wire, &state_b, &queue_b, 0);
        let receiver = coordinator.receiver();

        for i in 0..3u64 {
            device.send("/mics6814/co", i);
            coordinator.reassembler().service(wire.clock().now_us());
        }

        assert_eq!(receiver.pending(), 3);
        for i in 0..3u64 {
            assert_eq!(receiver.poll().unwrap().as_value(), Some(Value::Uint64(i)));
        }
        assert!(receiver.poll().is_none());
    }

    #[test]
    fn test_configure_is_idempotent_reset() {
        let state = LinkState::new();
        let queue = LinkQueue::new();
        let wire = Wire::new();
        let mut t = transport(&wire, &state, &queue, 0);

        wire.inject_bytes(&Frame::value(1, "/x", 1u64).to_bytes());
        t.reassembler().service(0);
        wire.inject_bytes(&[0x55, 0x55]);
        assert_eq!(queue.len(), 1);
        assert_eq!(state.bit_offset(), 16);

        t.configure(6);
        t.configure(6);
        assert_eq!(t.own_id(), 6);
        assert!(state.is_idle());
        assert_eq!(state.snapshot(), [0u8; FRAME_SIZE]);
        assert!(t.poll().is_none());
        assert_eq!(t.mode(), LinkMode::Receiving);
        assert!(t.lines().is_armed());
    }

    #[test]
    fn test_unconfigured_transport_hears_nothing() {
        let state = LinkState::new();
        let queue: LinkQueue<4> = LinkQueue::new();
        let wire = Wire::new();
        let _t = Transport::new(
            &state,
            &queue,
            wire.attach(&state),
            wire.delay(),
            LinkTiming::DEFAULT,
        );

        wire.inject_bytes(&[0xFF; 4]);
        assert!(state.is_idle());
    }

    #[test]
    fn test_half_duplex_exclusivity() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut device = transport(&wire, &state_a, &queue_a, 1);
        let coordinator = transport(&wire, &state_b, &queue_b, 0);

        // A frame was arriving at the device when it started to transmit
        wire.inject_bytes(&[0xA5; 3]);
        assert_eq!(state_a.bit_offset(), 24);

        device.send("/ky038/level", 12i64);
        assert_eq!(wire.collisions(), 0);

        // Partial frame abandoned, not flushed, and own edges never sampled
        // even though the wire delivers them to the driver's tap
        assert!(state_a.is_idle());
        assert_eq!(state_a.bit_offset(), 0);
        assert_eq!(state_a.stats().abandoned, 1);
        assert_eq!(state_a.stats().overruns, 0);
        assert!(device.poll().is_none());
        assert_eq!(device.mode(), LinkMode::Receiving);
        assert_eq!(device.lines().line_mode(), LineMode::Input);
        assert!(device.lines().is_armed());

        // The coordinator's own partial frame plus the new one: it saw 24 + 344 bits
        assert_eq!(state_b.stats().overruns, 1);
    }

    #[test]
    fn test_stale_partial_frame_then_recovery() {
        let (state_a, state_b) = (LinkState::new(), LinkState::new());
        let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
        let wire = Wire::new();
        let mut device = transport(&wire, &state_a, &queue_a, 1);
        let coordinator = transport(&wire, &state_b, &queue_b, 0);
        let reassembler = coordinator.reassembler();

        // Noise burst, then silence longer than the frame gap
        wire.inject_bytes(&[0x0F]);
        wire.clock().advance_us(LinkTiming::DEFAULT.frame_gap_us + 1);
        assert_eq!(
            reassembler.service(wire.clock().now_us()),
            Reassembly::Abandoned
        );

        device.send("/ccs811/eco2", 400u32);
        assert_eq!(
            reassembler.service(wire.clock().now_us()),
            Reassembly::Accepted
        );
        assert_eq!(coordinator.poll().unwrap().as_value(), Some(Value::Uint64(400)));
    }

    #[test]
    fn test_sample_edge_reads_data_line() {
        let state = LinkState::new();
        let queue: LinkQueue<4> = LinkQueue::new();
        let wire = Wire::new();
        let mut t = Transport::new(
            &state,
            &queue,
            wire.attach(&state),
            wire.delay(),
            LinkTiming::DEFAULT,
        );
        t.configure(0);

        // Idle data line reads low
        assert_eq!(t.sample_edge(10), SampleOutcome::Stored);
        assert_eq!(state.bit_offset(), 1);
        assert_eq!(state.snapshot()[0], 0);
    }

    proptest! {
        #[test]
        fn prop_any_value_survives_the_wire(
            sender in 1u16..=u16::MAX,
            path in "/[a-z0-9_/]{0,30}",
            raw in any::<i64>(),
        ) {
            let (state_a, state_b) = (LinkState::new(), LinkState::new());
            let (queue_a, queue_b) = (LinkQueue::new(), LinkQueue::new());
            let wire = Wire::new();
            let mut device = transport(&wire, &state_a, &queue_a, sender);
            let coordinator = transport(&wire, &state_b, &queue_b, 0);

            device.send(path.as_str(), raw);
            prop_assert_eq!(
                coordinator.reassembler().service(wire.clock().now_us()),
                Reassembly::Accepted
            );

            let frame = coordinator.poll().unwrap();
            prop_assert_eq!(frame.recipient_id, sender);
            prop_assert_eq!(frame.path.as_str(), Some(path.as_str()));
            prop_assert_eq!(frame.as_value(), Some(Value::Int64(raw)));
        }
    }
}
