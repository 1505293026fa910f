//! Abstraction traits used by the transport layer (CAN engine, frame
//! transport capability, timer, and the timed send extension).
pub mod can_engine;
pub mod frame_transport;
pub mod timed_send;
pub mod transport_timer;
