//! Error types
//!
//! Each protocol-level error kind maps through `reply()` to the single reply
//! the server sends for it. Callers match on the kind, never on reply text.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::Reply;

/// A command line that does not match the command grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("unrecognized command token")]
    UnknownCommand,
    #[error("command token {0} is not followed by a space")]
    MissingSpace(&'static str),
    #[error("invalid command parameter")]
    InvalidParameter,
    #[error("line is not terminated by CRLF")]
    MissingCrlf,
    #[error("command line longer than {0} bytes")]
    TooLong(usize),
}

impl GrammarError {
    pub fn reply(&self) -> Reply {
        match self {
            GrammarError::UnknownCommand | GrammarError::TooLong(_) => Reply::SyntaxError,
            GrammarError::MissingSpace(_)
            | GrammarError::InvalidParameter
            | GrammarError::MissingCrlf => Reply::ParameterError,
        }
    }
}

/// A well-formed command received in a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("bad sequence of commands")]
    BadSequence,
}

impl OrderingError {
    pub fn reply(&self) -> Reply {
        match self {
            OrderingError::NotLoggedIn => Reply::NotLoggedIn,
            OrderingError::BadSequence => Reply::BadSequence,
        }
    }
}

/// Failures of an approved RETR.
///
/// `FileUnavailable` and `Connect` are reported before any 150 goes out;
/// `Aborted` always follows a 150 already on the wire.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file not found or access denied: {0}")]
    FileUnavailable(String),
    #[error("cannot open data connection: {0}")]
    Connect(#[source] io::Error),
    #[error("data transfer aborted: {0}")]
    Aborted(#[source] io::Error),
}

impl TransferError {
    pub fn reply(&self) -> Reply {
        match self {
            TransferError::FileUnavailable(_) => Reply::FileUnavailable,
            TransferError::Connect(_) | TransferError::Aborted(_) => Reply::CannotOpenData,
        }
    }
}

/// A driver line that does not match the CONNECT/GET/QUIT grammar.
///
/// The display text is what the client prints on its console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("ERROR -- Command Unexpected/Unknown")]
    Unexpected,
    #[error("ERROR -- request")]
    Request,
    #[error("ERROR -- server-host")]
    ServerHost,
    #[error("ERROR -- server-port")]
    ServerPort,
    #[error("ERROR -- pathname")]
    Pathname,
    #[error("ERROR -- <CRLF>")]
    Crlf,
}

/// A server reply line that does not match the reply grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("ERROR -- reply-code")]
    Code,
    #[error("ERROR -- reply-text")]
    Text,
    #[error("ERROR -- <CRLF>")]
    Crlf,
}

/// Client-side failures.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("control connection I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("control connection closed by server")]
    Closed,
    #[error("server replied {0}")]
    Rejected(u16),
    #[error("malformed server reply: {0}")]
    MalformedReply(ReplyError),
    #[error("no IPv4 address found for {0}")]
    NoIpv4Address(String),
    #[error("cannot open data port {0}: {1}")]
    DataPort(u16, #[source] io::Error),
    #[error("no data connection within {0:?}")]
    AcceptTimeout(Duration),
    #[error("data transfer failed: {0}")]
    Data(#[source] io::Error),
    #[error("console output failed: {0}")]
    Console(#[source] io::Error),
}

impl ClientError {
    /// Whether the control connection must be dropped after this error.
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(self, ClientError::Io(_) | ClientError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_replies() {
        assert_eq!(GrammarError::UnknownCommand.reply().code(), 500);
        assert_eq!(GrammarError::TooLong(512).reply().code(), 500);
        assert_eq!(GrammarError::MissingSpace("USER").reply().code(), 501);
        assert_eq!(GrammarError::InvalidParameter.reply().code(), 501);
        assert_eq!(GrammarError::MissingCrlf.reply().code(), 501);
    }

    #[test]
    fn test_ordering_and_transfer_replies() {
        assert_eq!(OrderingError::NotLoggedIn.reply().code(), 530);
        assert_eq!(OrderingError::BadSequence.reply().code(), 503);
        assert_eq!(TransferError::FileUnavailable("x".into()).reply().code(), 550);
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(TransferError::Connect(refused).reply().code(), 425);
    }

    #[test]
    fn test_console_text() {
        assert_eq!(RequestError::Crlf.to_string(), "ERROR -- <CRLF>");
        assert_eq!(ReplyError::Code.to_string(), "ERROR -- reply-code");
    }

    #[test]
    fn test_fatal_client_errors() {
        assert!(ClientError::Closed.is_fatal_to_connection());
        assert!(!ClientError::Rejected(550).is_fatal_to_connection());
        assert!(!ClientError::MalformedReply(ReplyError::Text).is_fatal_to_connection());
    }
}
