//! `korri-can2040` library: interrupt-safe CAN frame transport for the
//! RP2040 software CAN controller in a `no_std` environment. The crate exposes
//! the infrastructure modules (wire codec, lock-free frame queue) and the
//! transport layer (frame record, engine registry, polling transport).
#![no_std]
//==================================================================================
/// Errors shared across the crate (frame construction, registry binding,
/// transport misuse and transmit failures).
pub mod error;
/// Pure building blocks: wire-format codec and SPSC frame queue.
pub mod infra;
/// Frame record, engine abstraction, engine registry and the polling transport.
pub mod transport;
//==================================================================================
