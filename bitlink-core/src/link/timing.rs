//! Link timing constants
//!
//! There is no clock recovery: timing is the framing mechanism, so every
//! device on a link must use identical values.
//!
//! One bit on the wire:
//!
//! ```text
//! data   ══X═══════════════════════════X══
//!          │ setup │ strobe  │  hold   │
//! signal ──────────┐‾‾‾‾‾‾‾‾‾┐──────────────
//!                  ▲ sample
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bitlink_protocol::FRAME_BITS;

/// Per-bit holds and inter-frame gap, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkTiming {
    /// Data line settle time before the strobe rises
    pub setup_us: u32,
    /// Strobe high time
    pub strobe_us: u32,
    /// Hold after the strobe falls
    pub hold_us: u32,
    /// Idle time after the last bit of a frame
    ///
    /// A partial frame with no edge for this long is abandoned.
    pub frame_gap_us: u32,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LinkTiming {
    pub const DEFAULT: Self = Self {
        setup_us: 100,
        strobe_us: 100,
        hold_us: 100,
        frame_gap_us: 5_000,
    };

    /// Time between consecutive strobe edges
    pub const fn bit_period_us(&self) -> u32 {
        self.setup_us + self.strobe_us + self.hold_us
    }

    /// Worst-case duration of one `send`, gap included
    pub const fn frame_duration_us(&self) -> u64 {
        FRAME_BITS as u64 * self.bit_period_us() as u64 + self.frame_gap_us as u64
    }

    /// Reassembler period: twice per bit
    pub const fn reassembly_interval_us(&self) -> u32 {
        let half = self.bit_period_us() / 2;
        if half == 0 {
            1
        } else {
            half
        }
    }

    /// All holds non-zero and the gap longer than two bit periods
    pub const fn is_valid(&self) -> bool {
        self.setup_us > 0
            && self.strobe_us > 0
            && self.hold_us > 0
            && self.frame_gap_us > 2 * self.bit_period_us()
    }
}
