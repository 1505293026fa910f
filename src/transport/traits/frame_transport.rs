//! Capability interface shared by every frame transport. Higher protocol
//! layers depend on this trait only, so another engine (for instance a
//! hardware controller) can be swapped in without touching callers.
use crate::transport::can_frame::CanFrame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Route taken by an accepted frame.
pub enum SendStatus {
    /// Handed straight to the engine.
    Submitted,
    /// Parked in the transmit queue; drained by a later poll.
    Queued,
}

/// Non-blocking frame-level send/receive.
pub trait FrameTransport {
    type Error: core::fmt::Debug;

    /// Make transmit progress, then report whether a received frame is waiting.
    fn available(&mut self) -> bool;

    /// Pop the oldest received frame; `None` when nothing is waiting.
    fn next_frame(&mut self) -> Option<CanFrame>;

    /// Submit or queue a frame. Fails immediately, never waits.
    fn send(&mut self, frame: &CanFrame) -> Result<SendStatus, Self::Error>;

    /// Restart the underlying engine with empty queues and zeroed counters.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Frames handed to the application.
    fn received_count(&self) -> u32;

    /// Frames handed to the engine.
    fn sent_count(&self) -> u32;

    /// Failed `send()` calls.
    fn send_error_count(&self) -> u32;
}
