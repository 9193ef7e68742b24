//! FTP client
//!
//! The control connection to a server and the driver that turns console
//! requests into control channel exchanges.

pub mod connection;
pub mod driver;

pub use connection::ControlConnection;
pub use driver::ClientDriver;
