//! FTP Protocol implementation
//!
//! Grammars for the three kinds of control-channel text (server commands,
//! client driver requests and server replies) and the reply taxonomy.

pub mod commands;
pub mod grammar;
pub mod lines;
pub mod parser;
pub mod requests;
pub mod responses;

pub use commands::{Command, TransferType, parse_command};
pub use lines::read_line_polling;
pub use parser::{ReplyLine, parse_reply};
pub use requests::{Request, RequestKind, parse_request};
pub use responses::{Reply, format_response};
