//! Driver request vocabulary
//!
//! The commands a user types into the client:
//!
//! ```text
//! CONNECT<SP>+<server-host><SP>+<server-port><CRLF>
//! GET<SP>+<pathname><CRLF>
//! QUIT<CRLF>
//! ```
//!
//! `<server-host>` is a domain of dot-separated elements, each a letter
//! followed by letters, digits or hyphens. `<server-port>` is 0-65535 written
//! without a leading zero.

use std::fmt;

use crate::error::RequestError;
use crate::protocol::grammar::{
    decimal, is_digit, is_let_dig_hyp, is_letter, match_token, normalize_pathname,
    printable_string, skip_spaces, strip_crlf, take_while, Token,
};

const VOCABULARY: [&str; 3] = ["CONNECT", "GET", "QUIT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Connect,
    Get,
    Quit,
}

impl RequestKind {
    /// Identifies the request a line is trying to make, even when the line
    /// itself is malformed.
    pub fn of(line: &str) -> Option<RequestKind> {
        let token = match match_token(line.trim_end_matches(['\r', '\n']), &VOCABULARY) {
            Token::Known(token, _) | Token::Glued(token) => token,
            Token::Unknown => return None,
        };
        match token {
            "CONNECT" => Some(RequestKind::Connect),
            "GET" => Some(RequestKind::Get),
            "QUIT" => Some(RequestKind::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Connect { host: String, port: u16 },
    Get(String),
    Quit,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Connect { .. } => RequestKind::Connect,
            Request::Get(_) => RequestKind::Get,
            Request::Quit => RequestKind::Quit,
        }
    }
}

/// The acknowledgement printed once a request has been accepted.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Connect { host, port } => write!(
                f,
                "CONNECT accepted for FTP server at host {host} and port {port}"
            ),
            Request::Get(path) => write!(f, "GET accepted for {path}"),
            Request::Quit => write!(f, "QUIT accepted, terminating FTP client"),
        }
    }
}

pub fn parse_request(line: &str) -> Result<Request, RequestError> {
    let (token, rest) = match match_token(line.trim_end_matches(['\r', '\n']), &VOCABULARY) {
        Token::Known(token, _) => (token, &line[token.len()..]),
        Token::Glued(_) => return Err(RequestError::Request),
        Token::Unknown => return Err(RequestError::Unexpected),
    };
    let rest = strip_crlf(rest).ok_or(RequestError::Crlf)?;

    match token {
        "CONNECT" => parse_connect(rest),
        "GET" => parse_get(rest),
        "QUIT" if rest.is_empty() => Ok(Request::Quit),
        "QUIT" => Err(RequestError::Crlf),
        _ => Err(RequestError::Unexpected),
    }
}

fn parse_connect(rest: &str) -> Result<Request, RequestError> {
    let rest = skip_spaces(rest).ok_or(RequestError::Request)?;
    let (host, rest) = parse_domain(rest).ok_or(RequestError::ServerHost)?;
    let rest = skip_spaces(rest).ok_or(RequestError::ServerHost)?;

    let (digits, rest) = take_while(rest, is_digit);
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(RequestError::ServerPort);
    }
    let port = decimal(digits, u32::from(u16::MAX))
        .and_then(|port| u16::try_from(port).ok())
        .ok_or(RequestError::ServerPort)?;
    if !rest.is_empty() {
        return Err(RequestError::Crlf);
    }

    Ok(Request::Connect {
        host: host.to_string(),
        port,
    })
}

/// `<domain> ::= <element> | <element>"."<domain>`
///
/// Returns the domain and the text following it.
fn parse_domain(input: &str) -> Option<(&str, &str)> {
    let mut end = 0;
    loop {
        let element = &input[end..];
        if !element.starts_with(is_letter) {
            return None;
        }
        let (name, after) = take_while(&element[1..], is_let_dig_hyp);
        end += 1 + name.len();
        if after.starts_with('.') {
            end += 1;
        } else {
            return Some(input.split_at(end));
        }
    }
}

fn parse_get(rest: &str) -> Result<Request, RequestError> {
    let path = skip_spaces(rest).ok_or(RequestError::Pathname)?;
    let path = normalize_pathname(path);
    printable_string(&path).ok_or(RequestError::Pathname)?;
    Ok(Request::Get(path))
}
