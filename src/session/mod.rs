//! Session management
//!
//! Per-connection login and data-channel state, and the ordering rules every
//! parsed command passes through before it executes.

pub mod state;

pub use state::{Action, LoginStage, Session};
