//! Wire frame codec: packs a [`CanFrame`] into the controller's message layout
//! and back.
//!
//! ## Layout
//!
//! ```text
//! id  : bit 31 = extended frame (EFF)
//!       bit 30 = remote request (RTR)
//!       bits 0..29 = arbitration identifier
//! dlc : 0..=8
//! data: 8-byte buffer, first `dlc` bytes meaningful
//! ```
pub mod traits;

use crate::transport::can_frame::{CanFrame, MAX_DATA_LEN, MAX_EXTENDED_ID};
use traits::WireFormat;

/// Extended-frame flag in [`WireMessage::id`].
pub const ID_EFF: u32 = 0x8000_0000;
/// Remote-request flag in [`WireMessage::id`].
pub const ID_RTR: u32 = 0x4000_0000;
/// Bits of [`WireMessage::id`] carrying flags rather than the identifier.
pub const ID_FLAGS_MASK: u32 = ID_EFF | ID_RTR;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
/// Message exactly as exchanged with the CAN engine.
pub struct WireMessage {
    /// Identifier with EFF/RTR flags in the two high bits.
    pub id: u32,
    /// Data length code.
    pub dlc: u32,
    /// Payload buffer.
    pub data: [u8; MAX_DATA_LEN],
}

impl WireMessage {
    /// `true` when the EFF flag is set.
    #[inline]
    pub fn is_extended(&self) -> bool {
        self.id & ID_EFF != 0
    }

    /// `true` when the RTR flag is set.
    #[inline]
    pub fn is_remote(&self) -> bool {
        self.id & ID_RTR != 0
    }

    /// Identifier with the flag bits removed.
    #[inline]
    pub fn arbitration_id(&self) -> u32 {
        self.id & !ID_FLAGS_MASK
    }
}

/// Pack a frame into its wire message. A `len` above 8 is clamped and the
/// identifier is truncated to 29 bits so it never reaches the flag bits.
pub fn encode(frame: &CanFrame) -> WireMessage {
    let len = frame.len.min(MAX_DATA_LEN);
    let mut data = [0; MAX_DATA_LEN];
    data[..len].copy_from_slice(&frame.data[..len]);

    let mut id = frame.id & MAX_EXTENDED_ID;
    if frame.rtr {
        id |= ID_RTR;
    }
    if frame.ext {
        id |= ID_EFF;
    }

    WireMessage {
        id,
        dlc: len as u32,
        data,
    }
}

/// Unpack a wire message. A malformed `dlc` above 8 is clamped on read.
pub fn decode(msg: &WireMessage) -> CanFrame {
    let len = (msg.dlc as usize).min(MAX_DATA_LEN);
    let mut data = [0; MAX_DATA_LEN];
    data[..len].copy_from_slice(&msg.data[..len]);

    CanFrame {
        id: msg.arbitration_id(),
        len,
        rtr: msg.is_remote(),
        ext: msg.is_extended(),
        data,
    }
}

impl WireFormat for CanFrame {
    fn to_wire(&self) -> WireMessage {
        encode(self)
    }

    fn from_wire(msg: &WireMessage) -> Self {
        decode(msg)
    }
}

impl From<&CanFrame> for WireMessage {
    fn from(frame: &CanFrame) -> Self {
        encode(frame)
    }
}

impl From<&WireMessage> for CanFrame {
    fn from(msg: &WireMessage) -> Self {
        decode(msg)
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
