//! Queue of accepted frames
//!
//! The only lock in the link. The reassembler pushes, consumers pop; both
//! hold the lock for a single `Deque` operation.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use bitlink_protocol::Frame;

/// Bounded FIFO of accepted frames, in completion order
pub struct LinkQueue<const N: usize> {
    frames: Mutex<CriticalSectionRawMutex, RefCell<Deque<Frame, N>>>,
}

impl<const N: usize> Default for LinkQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LinkQueue<N> {
    pub const fn new() -> Self {
        Self {
            frames: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Append a frame; hands it back if the queue is full
    pub fn push(&self, frame: Frame) -> Result<(), Frame> {
        self.frames
            .lock(|frames| frames.borrow_mut().push_back(frame))
    }

    /// Remove the oldest frame
    pub fn pop(&self) -> Option<Frame> {
        self.frames.lock(|frames| frames.borrow_mut().pop_front())
    }

    pub fn len(&self) -> usize {
        self.frames.lock(|frames| frames.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all pending frames
    pub fn clear(&self) {
        self.frames.lock(|frames| frames.borrow_mut().clear());
    }
}
