//! Transfer module
//!
//! The active-mode data channel: the client's listening socket, the server's
//! connect-back, file streaming, and the retrieved-file store.

pub mod data_channel;
pub mod file_ops;
pub mod listener;
pub mod store;

pub use data_channel::{ActiveConnector, DataConnector, LocalCopy};
pub use file_ops::{open_for_retrieval, resolve_file_path, send_file};
pub use listener::DataListener;
pub use store::RetrievedFiles;
