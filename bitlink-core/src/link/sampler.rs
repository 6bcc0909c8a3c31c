//! Edge-triggered bit sampling
//!
//! Runs once per strobe rising edge. Stores the data-line level as the next
//! bit of the frame being assembled and nothing else: no validation, no
//! allocation, no locks.

use bitlink_protocol::FRAME_BITS;

use super::state::{Counter, LinkState};

/// Result of sampling one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    /// Bit stored, frame still incomplete
    Stored,
    /// Bit stored and it was the last one; the reassembler should run
    Complete,
    /// Buffer already full and not yet reassembled; edge ignored
    Overrun,
    /// This device is transmitting; edge ignored
    Suspended,
}

/// Edge-context writer into a [`LinkState`]
#[derive(Clone, Copy)]
pub struct BitSampler<'a> {
    state: &'a LinkState,
}

impl<'a> BitSampler<'a> {
    pub const fn new(state: &'a LinkState) -> Self {
        Self { state }
    }

    /// Handle one strobe rising edge
    ///
    /// # Arguments
    /// - `level`: data-line level at the edge
    /// - `now_us`: monotonic timestamp in microseconds (wrapping)
    pub fn on_edge(&self, level: bool, now_us: u32) -> SampleOutcome {
        if self.state.is_suspended() {
            return SampleOutcome::Suspended;
        }

        let offset = self.state.bit_offset();
        if offset >= FRAME_BITS {
            // Count each lost frame once, not every ignored edge
            if self.state.latch_overrun() {
                self.state.bump(Counter::Overrun);
            }
            return SampleOutcome::Overrun;
        }

        self.state.write_bit(offset, level);
        self.state.publish_bit(offset + 1, now_us);

        if offset + 1 == FRAME_BITS {
            SampleOutcome::Complete
        } else {
            SampleOutcome::Stored
        }
    }
}
