//! Server core functionality
//!
//! The accept loop, the local batch mode, and the control channel driver
//! shared by both.

pub mod core;
pub mod handler;

pub use core::{Server, run_local};
pub use handler::{SessionEnd, SessionOptions, run_session};
