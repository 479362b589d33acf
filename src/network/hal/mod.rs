//! Platform boundary: raw frame I/O and the millisecond tick.
//!
//! The resolution engine only talks to the outside world through these
//! traits. Implementations must never block.

pub mod channel;
pub mod timer;

use super::error::NetError;

pub trait FrameSender {
    /// Puts one complete Ethernet frame (header and payload) on the wire.
    fn send(&mut self, frame: &[u8]) -> Result<(), NetError>;
}

pub trait FrameReceiver {
    /// Copies the next pending frame into `buffer` and returns its length,
    /// or 0 when nothing is available. Frames longer than `buffer` are
    /// truncated; a larger return value is clamped by the caller.
    fn try_receive(&mut self, buffer: &mut [u8]) -> usize;
}

/// Monotonic millisecond counter. Wraps around, compare with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}
