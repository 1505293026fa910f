//! Infrastructure shared by the transport: wire-format codec and the
//! lock-free frame queue used across execution contexts.
pub mod codec;
pub mod queue;
