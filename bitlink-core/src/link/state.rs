//! Per-device receive state
//!
//! # Ownership
//!
//! - raw buffer, bit offset, last-edge time: written by the sampler (edge
//!   context); reset by the reassembler only once the offset reached
//!   [`FRAME_BITS`] or the partial frame went stale
//! - own id: written by the facade at configure time
//! - counters: incremented from either context
//!
//! The sampler publishes each bit with a `Release` store of the offset and
//! the reassembler reads the offset with `Acquire` before looking at the
//! buffer, so a buffer observed as complete is fully written.
//!
//! `portable-atomic` provides read-modify-write operations on cores that
//! lack them natively (thumbv6m), via its critical-section fallback.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use bitlink_protocol::{FRAME_BITS, FRAME_SIZE};

/// Snapshot of link counters
///
/// All counters are monotonic and wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames that passed the address filter and entered the queue
    pub accepted: u32,
    /// Complete frames dropped by the address filter or kind check
    pub rejected: u32,
    /// Partial frames discarded (stale, or interrupted by a transmission)
    pub abandoned: u32,
    /// Frames lost because edges arrived before reassembly reset the buffer
    pub overruns: u32,
    /// Accepted frames lost because the queue was full
    pub dropped: u32,
    /// Frames transmitted by this device
    pub sent: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Counter {
    Accepted,
    Rejected,
    Abandoned,
    Overrun,
    Dropped,
    Sent,
}

/// Receive state of one bit-link port
///
/// All fields are lock-free so the edge context never blocks. Create one
/// per port (typically in a `static`, `new` is `const`) and hand references
/// to the sampler, reassembler and facade.
pub struct LinkState {
    raw: [AtomicU8; FRAME_SIZE],
    bit_offset: AtomicUsize,
    last_edge_us: AtomicU32,
    own_id: AtomicU16,
    /// Set while this device transmits; the sampler drops every edge
    suspended: AtomicBool,
    /// Set by the first edge ignored at a full buffer, cleared on reset
    overrun_latched: AtomicBool,

    accepted: AtomicU32,
    rejected: AtomicU32,
    abandoned: AtomicU32,
    overruns: AtomicU32,
    dropped: AtomicU32,
    sent: AtomicU32,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkState {
    /// Create an idle link state (offset 0, own id 0)
    pub const fn new() -> Self {
        Self {
            raw: [const { AtomicU8::new(0) }; FRAME_SIZE],
            bit_offset: AtomicUsize::new(0),
            last_edge_us: AtomicU32::new(0),
            own_id: AtomicU16::new(0),
            suspended: AtomicBool::new(false),
            overrun_latched: AtomicBool::new(false),
            accepted: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            abandoned: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            sent: AtomicU32::new(0),
        }
    }

    /// Receive-filter address of this device
    pub fn own_id(&self) -> u16 {
        self.own_id.load(Ordering::Relaxed)
    }

    pub(crate) fn set_own_id(&self, id: u16) {
        self.own_id.store(id, Ordering::Relaxed);
    }

    /// Number of bits sampled into the current frame
    pub fn bit_offset(&self) -> usize {
        self.bit_offset.load(Ordering::Acquire)
    }

    /// No frame is being received
    pub fn is_idle(&self) -> bool {
        self.bit_offset() == 0
    }

    /// A full frame is waiting for the reassembler
    pub fn is_complete(&self) -> bool {
        self.bit_offset() >= FRAME_BITS
    }

    /// Reception is suspended by an ongoing transmission
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    /// Timestamp of the most recently sampled edge (µs, wrapping)
    pub fn last_edge_us(&self) -> u32 {
        self.last_edge_us.load(Ordering::Relaxed)
    }

    /// Current counter values
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
        }
    }

    /// Store one bit at `offset` (LSB-first within each byte)
    ///
    /// Single writer: only the sampler calls this, so a plain
    /// load/store pair is enough.
    pub(crate) fn write_bit(&self, offset: usize, level: bool) {
        let byte = &self.raw[offset / 8];
        let mask = 1u8 << (offset % 8);
        let current = byte.load(Ordering::Relaxed);
        let next = if level { current | mask } else { current & !mask };
        byte.store(next, Ordering::Relaxed);
    }

    pub(crate) fn publish_bit(&self, next_offset: usize, now_us: u32) {
        self.last_edge_us.store(now_us, Ordering::Relaxed);
        self.bit_offset.store(next_offset, Ordering::Release);
    }

    /// Latch the overrun flag; true on the first ignored edge of a cycle
    pub(crate) fn latch_overrun(&self) -> bool {
        !self.overrun_latched.swap(true, Ordering::Relaxed)
    }

    /// Copy of the raw buffer
    pub(crate) fn snapshot(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        for (dst, src) in out.iter_mut().zip(self.raw.iter()) {
            *dst = src.load(Ordering::Relaxed);
        }
        out
    }

    /// Zero the buffer and return to offset 0
    pub(crate) fn reset(&self) {
        for byte in self.raw.iter() {
            byte.store(0, Ordering::Relaxed);
        }
        self.overrun_latched.store(false, Ordering::Relaxed);
        self.bit_offset.store(0, Ordering::Release);
    }

    /// Enter transmit mode: stop sampling and discard a partial frame
    ///
    /// A complete frame still waiting for reassembly is kept. Returns true
    /// if a partial frame was abandoned.
    pub(crate) fn suspend(&self) -> bool {
        self.suspended.store(true, Ordering::Release);
        let offset = self.bit_offset();
        if offset > 0 && offset < FRAME_BITS {
            self.reset();
            self.bump(Counter::Abandoned);
            true
        } else {
            false
        }
    }

    pub(crate) fn resume(&self) {
        self.suspended.store(false, Ordering::Release);
    }

    pub(crate) fn bump(&self, counter: Counter) {
        let cell = match counter {
            Counter::Accepted => &self.accepted,
            Counter::Rejected => &self.rejected,
            Counter::Abandoned => &self.abandoned,
            Counter::Overrun => &self.overruns,
            Counter::Dropped => &self.dropped,
            Counter::Sent => &self.sent,
        };
        cell.fetch_add(1, Ordering::Relaxed);
    }
}
