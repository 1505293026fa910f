//! Application-facing representation of a classic CAN frame.
use crate::error::FrameError;
use embedded_can::{ExtendedId, Id, StandardId};

/// Largest payload of a classic CAN frame.
pub const MAX_DATA_LEN: usize = 8;
/// Largest 11-bit identifier.
pub const MAX_STANDARD_ID: u32 = 0x7FF;
/// Largest 29-bit identifier.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

#[derive(Clone, Copy, Debug, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One CAN frame as seen by the application.
///
/// Fields are public for cheap construction on the hot path; the checked
/// constructors enforce `len <= 8` and the identifier range. Only the first
/// `len` bytes of `data` are meaningful and take part in equality.
pub struct CanFrame {
    /// Arbitration identifier (11 or 29 significant bits).
    pub id: u32,
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
    /// Remote transmission request.
    pub rtr: bool,
    /// Extended (29-bit) identifier format.
    pub ext: bool,
    /// Payload buffer.
    pub data: [u8; MAX_DATA_LEN],
}

impl CanFrame {
    /// Zeroed standard data frame with an empty payload.
    pub const EMPTY: CanFrame = CanFrame {
        id: 0,
        len: 0,
        rtr: false,
        ext: false,
        data: [0; MAX_DATA_LEN],
    };

    /// Data frame with an 11-bit identifier.
    pub fn new_standard(id: u32, payload: &[u8]) -> Result<Self, FrameError> {
        Self::build(id, false, false, payload.len(), payload)
    }

    /// Data frame with a 29-bit identifier.
    pub fn new_extended(id: u32, payload: &[u8]) -> Result<Self, FrameError> {
        Self::build(id, true, false, payload.len(), payload)
    }

    /// Remote request frame; `len` is the requested DLC, the payload stays zeroed.
    pub fn new_remote(id: u32, extended: bool, len: usize) -> Result<Self, FrameError> {
        Self::build(id, extended, true, len, &[])
    }

    fn build(
        id: u32,
        ext: bool,
        rtr: bool,
        len: usize,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        let (max, bits) = if ext {
            (MAX_EXTENDED_ID, 29)
        } else {
            (MAX_STANDARD_ID, 11)
        };
        if id > max {
            return Err(FrameError::IdOutOfRange { id, bits });
        }
        if len > MAX_DATA_LEN {
            return Err(FrameError::PayloadTooLong { len });
        }

        let mut data = [0; MAX_DATA_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len,
            rtr,
            ext,
            data,
        })
    }

    /// Populated payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(MAX_DATA_LEN)]
    }
}

impl Default for CanFrame {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for CanFrame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.len == other.len
            && self.rtr == other.rtr
            && self.ext == other.ext
            && self.payload() == other.payload()
    }
}

//==================================================================================EMBEDDED_CAN
impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Standard(id) => Self::new_standard(id.as_raw() as u32, data).ok(),
            Id::Extended(id) => Self::new_extended(id.as_raw(), data).ok(),
        }
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        match id.into() {
            Id::Standard(id) => CanFrame::new_remote(id.as_raw() as u32, false, dlc).ok(),
            Id::Extended(id) => CanFrame::new_remote(id.as_raw(), true, dlc).ok(),
        }
    }

    fn is_extended(&self) -> bool {
        self.ext
    }

    fn is_remote_frame(&self) -> bool {
        self.rtr
    }

    fn id(&self) -> Id {
        // Out-of-range identifiers can only come from direct field writes; truncate them.
        if self.ext {
            Id::Extended(ExtendedId::new(self.id & MAX_EXTENDED_ID).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(
                StandardId::new((self.id & MAX_STANDARD_ID) as u16).unwrap_or(StandardId::ZERO),
            )
        }
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
