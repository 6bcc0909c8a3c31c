//! Simulated two-wire link for host tests
//!
//! Every attached device sees the same signal and data levels. A rising
//! signal edge samples the data line into every device whose edge detection
//! is armed, the driving device included, at the simulated time.

use core::cell::{Cell, RefCell};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use bitlink_hal::{LineMode, LinkLines};

use crate::link::{BitSampler, LinkState};

/// Monotonic nanosecond clock advanced only by [`SimDelay`]
#[derive(Default)]
pub struct Clock {
    now_ns: Cell<u64>,
}

impl Clock {
    pub fn now_us(&self) -> u32 {
        (self.now_ns.get() / 1_000) as u32
    }

    pub fn advance_us(&self, us: u32) {
        self.now_ns.set(self.now_ns.get() + us as u64 * 1_000);
    }
}

/// Delay provider that advances the shared clock instead of sleeping
pub struct SimDelay<'w> {
    clock: &'w Clock,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.now_ns.set(self.clock.now_ns.get() + ns as u64);
    }
}

struct Tap<'a> {
    state: &'a LinkState,
    armed: Cell<bool>,
    mode: Cell<LineMode>,
}

/// The shared signal/data pair
pub struct Wire<'a> {
    clock: Clock,
    signal: Cell<bool>,
    data: Cell<bool>,
    taps: RefCell<Vec<Tap<'a>>>,
    /// Rising edges seen while more than one device was driving
    collisions: Cell<u32>,
}

impl<'a> Wire<'a> {
    pub fn new() -> Self {
        Self {
            clock: Clock::default(),
            signal: Cell::new(false),
            data: Cell::new(false),
            taps: RefCell::new(Vec::new()),
            collisions: Cell::new(0),
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay { clock: &self.clock }
    }

    /// Connect a device's receive state; returns its line pair
    pub fn attach(&'a self, state: &'a LinkState) -> SimLines<'a> {
        let mut taps = self.taps.borrow_mut();
        taps.push(Tap {
            state,
            armed: Cell::new(false),
            mode: Cell::new(LineMode::Input),
        });
        SimLines {
            wire: self,
            tap: taps.len() - 1,
        }
    }

    pub fn collisions(&self) -> u32 {
        self.collisions.get()
    }

    fn drive_signal(&self, high: bool) {
        let rising = high && !self.signal.get();
        self.signal.set(high);
        if !rising {
            return;
        }

        let taps = self.taps.borrow();
        let drivers = taps
            .iter()
            .filter(|tap| tap.mode.get() == LineMode::Output)
            .count();
        if drivers > 1 {
            self.collisions.set(self.collisions.get() + 1);
        }

        let now_us = self.clock.now_us();
        for tap in taps.iter() {
            if tap.armed.get() {
                BitSampler::new(tap.state).on_edge(self.data.get(), now_us);
            }
        }
    }

    /// Inject one bit as an external sender would
    pub fn inject_bit(&self, level: bool) {
        self.data.set(level);
        self.signal.set(false);
        self.drive_signal(true);
        self.signal.set(false);
    }

    /// Inject raw bytes, LSB first
    pub fn inject_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            for bit in 0..8 {
                self.inject_bit((byte >> bit) & 1 == 1);
            }
        }
    }
}

/// One device's end of the [`Wire`]
pub struct SimLines<'a> {
    wire: &'a Wire<'a>,
    tap: usize,
}

impl SimLines<'_> {
    fn with_tap<R>(&self, f: impl FnOnce(&Tap<'_>) -> R) -> R {
        f(&self.wire.taps.borrow()[self.tap])
    }

    pub fn is_armed(&self) -> bool {
        self.with_tap(|tap| tap.armed.get())
    }

    pub fn line_mode(&self) -> LineMode {
        self.with_tap(|tap| tap.mode.get())
    }
}

impl LinkLines for SimLines<'_> {
    fn set_mode(&mut self, mode: LineMode) {
        self.with_tap(|tap| tap.mode.set(mode));
    }

    fn set_edge_detection(&mut self, enabled: bool) {
        self.with_tap(|tap| tap.armed.set(enabled));
    }

    fn set_signal(&mut self, high: bool) {
        if self.line_mode() == LineMode::Output {
            self.wire.drive_signal(high);
        }
    }

    fn set_data(&mut self, high: bool) {
        if self.line_mode() == LineMode::Output {
            self.wire.data.set(high);
        }
    }

    fn read_data(&self) -> bool {
        self.wire.data.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_hears_its_own_edge_when_armed() {
        let state = LinkState::new();
        let wire = Wire::new();
        let mut lines = wire.attach(&state);

        lines.set_mode(LineMode::Output);
        lines.set_edge_detection(true);
        lines.set_data(true);
        lines.set_signal(true);

        assert_eq!(state.bit_offset(), 1);
        assert_eq!(state.snapshot()[0], 0x01);
    }

    #[test]
    fn test_disarmed_tap_ignores_edges() {
        let state = LinkState::new();
        let wire = Wire::new();
        let _lines = wire.attach(&state);

        wire.inject_bit(true);
        assert!(state.is_idle());
    }
}
