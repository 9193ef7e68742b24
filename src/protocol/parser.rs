//! Reply parsing
//!
//! Client-side grammar for server replies:
//! `<reply-code><SP><reply-text><CRLF>`, with the code in 100-599.

use std::fmt;

use crate::error::ReplyError;
use crate::protocol::grammar::{decimal, printable_string, strip_crlf};
use crate::protocol::responses::is_error_code;

/// A reply line received from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: u16,
    pub text: String,
}

impl ReplyLine {
    pub fn is_error(&self) -> bool {
        is_error_code(self.code)
    }
}

impl fmt::Display for ReplyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FTP reply {} accepted. Text is: {}", self.code, self.text)
    }
}

pub fn parse_reply(line: &str) -> Result<ReplyLine, ReplyError> {
    let code = line
        .get(..3)
        .and_then(|digits| decimal(digits, 599))
        .filter(|code| *code >= 100)
        .and_then(|code| u16::try_from(code).ok())
        .ok_or(ReplyError::Code)?;

    let rest = line[3..].strip_prefix(' ').ok_or(ReplyError::Code)?;
    let text = strip_crlf(rest).ok_or(ReplyError::Crlf)?;
    let text = printable_string(text).ok_or(ReplyError::Text)?;

    Ok(ReplyLine {
        code,
        text: text.to_string(),
    })
}
