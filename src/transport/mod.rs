//! CAN transport layer: frame record, engine abstraction, the registry that
//! routes engine notifications, and the polling transport itself.
//!
//! ## Bus Timing Constants
//!
//! These constants define the fixed bus parameters and the recommended
//! timeouts for callers layering a bounded wait on top of `send()`.

pub mod can_frame;
pub mod config;
pub mod engine_transport;
pub mod registry;
pub mod traits;

/// Bus bit rate (bit/s). Fixed for the deployment: every node on the segment
/// must agree on it.
pub const CAN_BITRATE: u32 = 125_000;

/// Default system clock handed to the engine (Hz), the RP2040 nominal clock.
pub const DEFAULT_SYS_CLOCK_HZ: u32 = 125_000_000;

/// Recommended deadline for [`TimedSend::send_with_timeout`](traits::timed_send::TimedSend) (ms).
///
/// # Timeout rationale
///
/// At 125 kbit/s an 8-byte extended frame takes about 1 ms on the wire
/// without contention. Arbitration losses and retransmissions after error
/// frames stretch that to a few milliseconds on a loaded bus; a 100 ms budget
/// leaves a wide margin while still surfacing a dead bus quickly.
pub const CAN_SEND_TIMEOUT_MS: u32 = 100;

/// Delay between two attempts of the timed send loop (ms).
///
/// One frame time at the fixed bit rate: retrying faster only burns cycles
/// because the engine cannot free a transmit slot sooner.
pub const SEND_RETRY_INTERVAL_MS: u32 = 1;
