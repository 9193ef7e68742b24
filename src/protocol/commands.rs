//! Module `commands`
//!
//! Client-to-server command vocabulary and its grammar:
//!
//! ```text
//! USER<SP>+<username><CRLF>      PASS<SP>+<password><CRLF>
//! TYPE<SP>+<type-code><CRLF>     SYST<CRLF>   NOOP<CRLF>   QUIT<CRLF>
//! PORT<SP>+<host-port><CRLF>     RETR<SP>+<pathname><CRLF>
//! ```
//!
//! Tokens are matched case-insensitively; arguments are case-sensitive.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::GrammarError;
use crate::protocol::grammar::{
    decimal, match_token, normalize_pathname, printable_string, skip_spaces, strip_crlf, Token,
};

const VOCABULARY: [&str; 8] = ["USER", "PASS", "TYPE", "SYST", "NOOP", "QUIT", "PORT", "RETR"];

/// Representation type requested by TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Image,
    Ascii,
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Image => write!(f, "I"),
            TransferType::Ascii => write!(f, "A"),
        }
    }
}

/// A parsed FTP command sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    User(String),
    Pass(String),
    Type(TransferType),
    Syst,
    Noop,
    Quit,
    Port(SocketAddrV4),
    Retr(String),
}

impl Command {
    /// The command as it travels on the control channel, CRLF included.
    pub fn to_wire(&self) -> String {
        format!("{self}\r\n")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::User(name) => write!(f, "USER {name}"),
            Command::Pass(secret) => write!(f, "PASS {secret}"),
            Command::Type(kind) => write!(f, "TYPE {kind}"),
            Command::Syst => write!(f, "SYST"),
            Command::Noop => write!(f, "NOOP"),
            Command::Quit => write!(f, "QUIT"),
            Command::Port(endpoint) => write!(f, "PORT {}", encode_host_port(*endpoint)),
            Command::Retr(path) => write!(f, "RETR {path}"),
        }
    }
}

/// Parses one command line, terminator included.
///
/// The CRLF terminator is checked first, so a bare-LF line is a parameter
/// error whatever its content.
pub fn parse_command(line: &str) -> Result<Command, GrammarError> {
    let body = strip_crlf(line).ok_or(GrammarError::MissingCrlf)?;

    let (token, rest) = match match_token(body, &VOCABULARY) {
        Token::Known(token, rest) => (token, rest),
        Token::Glued(token) => return Err(GrammarError::MissingSpace(token)),
        Token::Unknown => return Err(GrammarError::UnknownCommand),
    };

    match token {
        "USER" => Ok(Command::User(printable_argument(rest)?.to_string())),
        "PASS" => Ok(Command::Pass(printable_argument(rest)?.to_string())),
        "TYPE" => match argument(rest)? {
            "I" => Ok(Command::Type(TransferType::Image)),
            "A" => Ok(Command::Type(TransferType::Ascii)),
            _ => Err(GrammarError::InvalidParameter),
        },
        "SYST" => no_argument(rest).map(|_| Command::Syst),
        "NOOP" => no_argument(rest).map(|_| Command::Noop),
        "QUIT" => no_argument(rest).map(|_| Command::Quit),
        "PORT" => parse_host_port(argument(rest)?).map(Command::Port),
        "RETR" => {
            let path = normalize_pathname(argument(rest)?);
            printable_string(&path).ok_or(GrammarError::InvalidParameter)?;
            Ok(Command::Retr(path))
        }
        _ => Err(GrammarError::UnknownCommand),
    }
}

/// `<SP>+<argument>`: whatever follows the separating spaces.
fn argument(rest: &str) -> Result<&str, GrammarError> {
    skip_spaces(rest).ok_or(GrammarError::InvalidParameter)
}

fn printable_argument(rest: &str) -> Result<&str, GrammarError> {
    printable_string(argument(rest)?).ok_or(GrammarError::InvalidParameter)
}

fn no_argument(rest: &str) -> Result<(), GrammarError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(GrammarError::InvalidParameter)
    }
}

/// `<host-port> ::= <h1>,<h2>,<h3>,<h4>,<p1>,<p2>`, each field 0-255.
pub fn parse_host_port(argument: &str) -> Result<SocketAddrV4, GrammarError> {
    let fields = argument
        .split(',')
        .map(|field| decimal(field, 255).and_then(|v| u8::try_from(v).ok()))
        .collect::<Option<Vec<u8>>>()
        .ok_or(GrammarError::InvalidParameter)?;

    let [h1, h2, h3, h4, p1, p2] =
        <[u8; 6]>::try_from(fields.as_slice()).map_err(|_| GrammarError::InvalidParameter)?;

    let port = u16::from(p1) * 256 + u16::from(p2);
    Ok(SocketAddrV4::new(Ipv4Addr::new(h1, h2, h3, h4), port))
}

/// Inverse of [`parse_host_port`].
pub fn encode_host_port(endpoint: SocketAddrV4) -> String {
    let [h1, h2, h3, h4] = endpoint.ip().octets();
    let port = endpoint.port();
    format!("{h1},{h2},{h3},{h4},{},{}", port / 256, port % 256)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Command {
        Command::User(name.to_string())
    }

    #[test]
    fn test_token_is_case_insensitive() {
        assert_eq!(parse_command("USER jasleen\r\n"), Ok(user("jasleen")));
        assert_eq!(parse_command("user jasleen\r\n"), Ok(user("jasleen")));
        assert_eq!(parse_command("UsEr jasleen\r\n"), Ok(user("jasleen")));
    }

    #[test]
    fn test_multiple_spaces_collapse() {
        assert_eq!(parse_command("USER    jasleen\r\n"), Ok(user("jasleen")));
        assert_eq!(
            parse_command("PASS   guest@\r\n"),
            Ok(Command::Pass("guest@".to_string()))
        );
    }

    #[test]
    fn test_missing_space_is_not_unknown() {
        assert_eq!(
            parse_command("USERjasleen\r\n"),
            Err(GrammarError::MissingSpace("USER"))
        );
        assert_eq!(parse_command("USERjasleen\r\n").unwrap_err().reply().code(), 501);
    }

    #[test]
    fn test_crlf_required() {
        assert_eq!(parse_command("USER jasleen\n"), Err(GrammarError::MissingCrlf));
        assert_eq!(parse_command("USER jasleen"), Err(GrammarError::MissingCrlf));
        assert_eq!(parse_command("FOO bar\n"), Err(GrammarError::MissingCrlf));
    }

    #[test]
    fn test_unknown_commands() {
        assert_eq!(parse_command("LIST\r\n"), Err(GrammarError::UnknownCommand));
        assert_eq!(parse_command("\r\n"), Err(GrammarError::UnknownCommand));
        assert_eq!(parse_command(" USER x\r\n"), Err(GrammarError::UnknownCommand));
        assert_eq!(parse_command("STOR a\r\n").unwrap_err().reply().code(), 500);
    }

    #[test]
    fn test_argument_is_required() {
        assert_eq!(parse_command("USER\r\n"), Err(GrammarError::InvalidParameter));
        assert_eq!(parse_command("USER \r\n"), Err(GrammarError::InvalidParameter));
        assert_eq!(parse_command("RETR   \r\n"), Err(GrammarError::InvalidParameter));
    }

    #[test]
    fn test_parameterless_commands() {
        assert_eq!(parse_command("SYST\r\n"), Ok(Command::Syst));
        assert_eq!(parse_command("noop\r\n"), Ok(Command::Noop));
        assert_eq!(parse_command("Quit\r\n"), Ok(Command::Quit));
        assert_eq!(parse_command("NOOP now\r\n"), Err(GrammarError::InvalidParameter));
        assert_eq!(parse_command("SYST \r\n"), Err(GrammarError::InvalidParameter));
    }

    #[test]
    fn test_type_argument_is_case_sensitive() {
        assert_eq!(
            parse_command("TYPE I\r\n"),
            Ok(Command::Type(TransferType::Image))
        );
        assert_eq!(
            parse_command("type A\r\n"),
            Ok(Command::Type(TransferType::Ascii))
        );
        assert_eq!(parse_command("TYPE i\r\n"), Err(GrammarError::InvalidParameter));
        assert_eq!(parse_command("TYPE E\r\n"), Err(GrammarError::InvalidParameter));
    }

    #[test]
    fn test_port_decodes_address_and_port() {
        let expected = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 1080);
        assert_eq!(
            parse_command("PORT 127,0,0,1,4,56\r\n"),
            Ok(Command::Port(expected))
        );
    }

    #[test]
    fn test_port_rejects_bad_fields() {
        for line in [
            "PORT 127,0,0,1,4\r\n",
            "PORT 127,0,0,1,4,56,7\r\n",
            "PORT 127,0,0,1,4,256\r\n",
            "PORT 127,0,0,x,4,56\r\n",
            "PORT 127,0,,1,4,56\r\n",
            "PORT -1,0,0,1,4,56\r\n",
        ] {
            assert_eq!(parse_command(line), Err(GrammarError::InvalidParameter), "{line:?}");
        }
    }

    #[test]
    fn test_retr_path_is_normalized() {
        assert_eq!(
            parse_command("RETR /a\\b.txt\r\n"),
            Ok(Command::Retr("a/b.txt".to_string()))
        );
        assert_eq!(parse_command("RETR /\r\n"), Err(GrammarError::InvalidParameter));
        assert_eq!(
            parse_command("RETR caf\u{e9}\r\n"),
            Err(GrammarError::InvalidParameter)
        );
    }

    #[test]
    fn test_wire_form() {
        let endpoint = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 7), 8081);
        assert_eq!(Command::Port(endpoint).to_wire(), "PORT 10,0,0,7,31,145\r\n");
        assert_eq!(Command::Type(TransferType::Image).to_wire(), "TYPE I\r\n");
        assert_eq!(encode_host_port(endpoint), "10,0,0,7,31,145");
    }
}
