//! Error handling
//!
//! Defines the error taxonomy shared by the server and the client: grammar,
//! ordering and transfer errors map to protocol replies, everything else is a
//! transport or console failure.

pub mod types;

pub use types::*;
