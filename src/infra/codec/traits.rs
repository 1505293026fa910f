//! Conversion trait between application records and the controller's wire layout.
use crate::infra::codec::WireMessage;

//==================================================================================WIRE_FORMAT
/// Implemented by records that have a controller-level wire representation.
/// Conversions are total: malformed input is clamped, never rejected.
pub trait WireFormat: Sized {
    /// Build the wire message handed to the engine.
    fn to_wire(&self) -> WireMessage;

    /// Rebuild the record from a message delivered by the engine.
    fn from_wire(msg: &WireMessage) -> Self;
}
