//! FTP Response handling
//!
//! The closed set of replies this server can send, with their canonical
//! texts. Code 200 carries three texts depending on the command that produced
//! it, so replies are identified by variant rather than by code.

use std::fmt;
use std::net::SocketAddrV4;

use crate::protocol::TransferType;

/// A reply the server sends on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    FileStatusOk,
    CommandOk,
    TypeSet(TransferType),
    PortOk(SocketAddrV4),
    SystemType,
    ServiceReady,
    Goodbye,
    GuestLogin,
    FileActionCompleted,
    GuestOk,
    CannotOpenData,
    SyntaxError,
    ParameterError,
    BadSequence,
    NotLoggedIn,
    FileUnavailable,
}

impl Reply {
    pub fn code(&self) -> u16 {
        match self {
            Reply::FileStatusOk => 150,
            Reply::CommandOk | Reply::TypeSet(_) | Reply::PortOk(_) => 200,
            Reply::SystemType => 215,
            Reply::ServiceReady => 220,
            Reply::Goodbye => 221,
            Reply::GuestLogin => 230,
            Reply::FileActionCompleted => 250,
            Reply::GuestOk => 331,
            Reply::CannotOpenData => 425,
            Reply::SyntaxError => 500,
            Reply::ParameterError => 501,
            Reply::BadSequence => 503,
            Reply::NotLoggedIn => 530,
            Reply::FileUnavailable => 550,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Reply::FileStatusOk => "File status okay.".into(),
            Reply::CommandOk => "Command OK.".into(),
            Reply::TypeSet(kind) => format!("Type set to {kind}."),
            Reply::PortOk(endpoint) => format!(
                "Port command successful ({},{}).",
                endpoint.ip(),
                endpoint.port()
            ),
            Reply::SystemType => "UNIX Type: L8.".into(),
            Reply::ServiceReady => "COMP 431 FTP server ready.".into(),
            Reply::Goodbye => "Goodbye.".into(),
            Reply::GuestLogin => "Guest login OK.".into(),
            Reply::FileActionCompleted => "Requested file action completed.".into(),
            Reply::GuestOk => "Guest access OK, send password.".into(),
            Reply::CannotOpenData => "Can not open data connection.".into(),
            Reply::SyntaxError => "Syntax error, command unrecognized.".into(),
            Reply::ParameterError => "Syntax error in parameter.".into(),
            Reply::BadSequence => "Bad sequence of commands.".into(),
            Reply::NotLoggedIn => "Not logged in.".into(),
            Reply::FileUnavailable => "File not found or access denied.".into(),
        }
    }

    /// Replies in the 4yz and 5yz classes.
    pub fn is_error(&self) -> bool {
        is_error_code(self.code())
    }

    /// The reply line as sent on the wire.
    pub fn to_wire(&self) -> String {
        format_response(self.code(), &self.text())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.text())
    }
}

pub fn is_error_code(code: u16) -> bool {
    (400..=599).contains(&code)
}

/// Format an FTP response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}
