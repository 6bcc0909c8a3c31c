//! Link line abstraction
//!
//! The bit-link uses two single-bit lines between exactly two devices:
//!
//! - **signal**: strobe line, a rising edge means "sample the data line now"
//! - **data**: the bit value, valid while the strobe is high
//!
//! Both lines are bidirectional. A device listens with both lines as inputs
//! and edge detection armed on the signal line, and switches both to outputs
//! for the duration of its own transmission.

/// Direction of both link lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    /// Both lines are high-impedance inputs (listening)
    Input,
    /// Both lines are driven outputs (transmitting)
    Output,
}

/// The signal/data line pair of a bit-link port
///
/// Implementations own the two GPIOs. Methods are infallible: a GPIO write
/// on the supported chips cannot fail, matching [`crate::OutputPin`].
pub trait LinkLines {
    /// Switch both lines to the given direction
    fn set_mode(&mut self, mode: LineMode);

    /// Arm or disarm rising-edge detection on the signal line
    ///
    /// While disarmed, no edge may reach the sampler.
    fn set_edge_detection(&mut self, enabled: bool);

    /// Drive the signal (strobe) line. Only meaningful in [`LineMode::Output`].
    fn set_signal(&mut self, high: bool);

    /// Drive the data line. Only meaningful in [`LineMode::Output`].
    fn set_data(&mut self, high: bool);

    /// Read the current level of the data line
    fn read_data(&self) -> bool;
}
