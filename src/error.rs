//! Error definitions shared across library modules.
//! Queue overflow on the receive path is never an error value: it is absorbed
//! as a counter so the notification context stays side-effect free.
use thiserror_no_std::Error;

//==================================================================================FRAME_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while building a [`CanFrame`](crate::transport::can_frame::CanFrame).
pub enum FrameError {
    /// Classic CAN carries at most eight payload bytes.
    #[error("Payload too long: {len} bytes (max 8)")]
    PayloadTooLong { len: usize },
    /// Identifier does not fit the 11-bit (standard) or 29-bit (extended) range.
    #[error("Identifier {id:#x} does not fit in {bits} bits")]
    IdOutOfRange { id: u32, bits: u8 },
}

//==================================================================================REGISTRY_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised by the engine registry.
pub enum RegistryError {
    /// No slot exists for this engine instance number.
    #[error("Invalid engine instance: {instance}")]
    InvalidInstance { instance: u8 },
    /// Another transport already listens on this engine instance.
    #[error("Engine instance {instance} already bound")]
    SlotInUse { instance: u8 },
}

//==================================================================================TRANSPORT_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors surfaced by the transport to its caller.
pub enum TransportError<E: core::fmt::Debug> {
    /// `begin()` called while the engine is already running.
    #[error("Transport already running")]
    AlreadyRunning,
    /// Operation requires a running engine.
    #[error("Transport not running")]
    NotRunning,
    /// Engine was busy and the transmit queue had no room left.
    #[error("Transmit queue full")]
    QueueFull,
    /// Engine reported ready but refused the frame.
    #[error("Engine rejected frame: {0:?}")]
    EngineRejected(E),
    /// The shared receive state is claimed by another running transport.
    #[error("Shared transport state already in use")]
    SharedInUse,
    /// Engine could not be configured or started.
    #[error("Engine start failed: {0:?}")]
    EngineStart(E),
    /// Engine instance could not be bound to the notification registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Classifies failures a caller may wait out by retrying later.
pub trait TransientError {
    /// `true` when the same operation may succeed on a later attempt.
    fn is_transient(&self) -> bool;
}

impl<E: core::fmt::Debug> TransientError for TransportError<E> {
    fn is_transient(&self) -> bool {
        matches!(self, Self::QueueFull | Self::EngineRejected(_))
    }
}

//==================================================================================SEND_TIMEOUT_ERROR
#[derive(Error, Debug)]
/// Errors returned by the timed send helper.
pub enum SendTimeoutError<E: core::fmt::Debug> {
    /// Transient failures persisted until the deadline.
    #[error("Send timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u32 },
    /// Non-retryable failure reported by the transport.
    #[error("Transport error: {0:?}")]
    Transport(E),
}
