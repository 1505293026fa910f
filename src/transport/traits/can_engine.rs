//! Contract of the bit-level CAN engine the transport drives. The engine owns
//! arbitration, stuffing, CRC, ACK and error confinement; the transport only
//! starts it, asks whether it can take a frame, submits frames, and receives
//! its asynchronous notifications.
use crate::infra::codec::WireMessage;
use crate::transport::config::TransportConfig;
use crate::transport::registry::EngineInstance;

//==================================================================================NOTIFY
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Event reported by the engine from its notification context.
pub enum NotifyKind {
    /// A frame was received; the message holds it.
    RxComplete,
    /// A submitted frame went out on the bus.
    TxComplete,
    /// The engine observed a bus-level error.
    Error,
}

impl NotifyKind {
    /// Raw notification bit for a received frame.
    pub const RAW_RX: u32 = 1 << 0;
    /// Raw notification bit for a transmitted frame.
    pub const RAW_TX: u32 = 1 << 1;
    /// Raw notification bit for an error.
    pub const RAW_ERROR: u32 = 1 << 2;

    /// Map the engine's raw notification code; `None` for unknown codes.
    pub fn from_raw(notify: u32) -> Option<Self> {
        match notify {
            Self::RAW_RX => Some(Self::RxComplete),
            Self::RAW_TX => Some(Self::TxComplete),
            Self::RAW_ERROR => Some(Self::Error),
            _ => None,
        }
    }

    /// Raw notification code understood by the engine.
    pub fn as_raw(self) -> u32 {
        match self {
            Self::RxComplete => Self::RAW_RX,
            Self::TxComplete => Self::RAW_TX,
            Self::Error => Self::RAW_ERROR,
        }
    }
}

/// Callback the engine invokes from its notification context.
///
/// Must not block or allocate. The transport passes a per-slot trampoline
/// obtained from [`registry::callback_for`](crate::transport::registry::callback_for).
pub type NotifyCallback = fn(EngineInstance, NotifyKind, &WireMessage);

//==================================================================================STATISTICS
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Counters maintained by the engine itself.
pub struct EngineStatistics {
    /// Frames received from the bus.
    pub rx_total: u32,
    /// Frames transmitted successfully.
    pub tx_total: u32,
    /// Transmission attempts, including retries.
    pub tx_attempt: u32,
    /// Malformed frames seen on the bus.
    pub parse_error: u32,
}

//==================================================================================CAN_ENGINE
/// Bit-level CAN controller consumed by [`Transport`](crate::transport::engine_transport::Transport).
pub trait CanEngine: Sized {
    type Error: core::fmt::Debug;

    /// Configure the controller, register `callback`, and start bus processing.
    /// The returned instance is the running engine.
    fn start(config: &TransportConfig, callback: NotifyCallback) -> Result<Self, Self::Error>;

    /// Stop bus processing. No notification fires once this returns.
    fn stop(&mut self);

    /// `true` when the engine can take a frame right now.
    fn can_accept(&self) -> bool;

    /// Hand a frame to the engine for transmission. May still refuse it.
    fn submit(&mut self, msg: &WireMessage) -> Result<(), Self::Error>;

    /// Engine-side counters. Engines without instrumentation report zeros.
    fn statistics(&self) -> EngineStatistics {
        EngineStatistics::default()
    }
}
