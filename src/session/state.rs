//! Module `state`
//!
//! Defines the `Session` struct: the login stage, the armed data channel and
//! the retrieval counter of one control connection, together with the
//! ordering rules applied to each command before it runs.

use std::net::SocketAddrV4;

use log::debug;

use crate::error::OrderingError;
use crate::protocol::{Command, Reply};

/// How far the USER/PASS exchange has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStage {
    #[default]
    NoUser,
    UserGiven,
    Authenticated,
}

/// What the control channel driver must do after a command was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send one reply and keep reading.
    Reply(Reply),
    /// Send the reply, then end the session.
    Close(Reply),
    /// Stream `path` to the client's data endpoint.
    Retrieve { path: String, endpoint: SocketAddrV4 },
}

/// State of one control connection.
///
/// The data channel is armed exactly while `data_endpoint` holds the address
/// from the last PORT; RETR always takes it.
#[derive(Debug, Default)]
pub struct Session {
    login: LoginStage,
    data_endpoint: Option<SocketAddrV4>,
    files_retrieved: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the initial state, as on disconnect.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn login_stage(&self) -> LoginStage {
        self.login
    }

    /// Whether a PORT has been accepted since the last RETR.
    pub fn is_data_channel_armed(&self) -> bool {
        self.data_endpoint.is_some()
    }

    pub fn data_endpoint(&self) -> Option<SocketAddrV4> {
        self.data_endpoint
    }

    pub fn files_retrieved(&self) -> u32 {
        self.files_retrieved
    }

    /// Counts one completed retrieval and returns the new total.
    pub fn record_retrieval(&mut self) -> u32 {
        self.files_retrieved += 1;
        self.files_retrieved
    }

    /// Applies the ordering rules, in precedence order.
    ///
    /// A command refused here has no effect beyond the login reset that a
    /// PASS-less USER incurs.
    pub fn authorize(&mut self, command: &Command) -> Result<(), OrderingError> {
        let is_user = matches!(command, Command::User(_));
        let is_pass = matches!(command, Command::Pass(_));

        if self.login == LoginStage::NoUser && !is_user {
            return Err(OrderingError::NotLoggedIn);
        }
        if self.login != LoginStage::Authenticated && !is_user && !is_pass {
            debug!("Discarding USER not followed by PASS");
            self.login = LoginStage::NoUser;
            return Err(OrderingError::NotLoggedIn);
        }
        if matches!(command, Command::Retr(_)) && !self.is_data_channel_armed() {
            return Err(OrderingError::BadSequence);
        }
        Ok(())
    }

    /// Authorizes `command` and applies its state transition.
    ///
    /// RETR only disarms the data channel here; the transfer itself is the
    /// driver's job, described by the returned [`Action::Retrieve`].
    pub fn execute(&mut self, command: Command) -> Result<Action, OrderingError> {
        self.authorize(&command)?;

        let action = match command {
            Command::User(_) => {
                self.login = LoginStage::UserGiven;
                Action::Reply(Reply::GuestOk)
            }
            Command::Pass(_) => {
                self.login = LoginStage::Authenticated;
                Action::Reply(Reply::GuestLogin)
            }
            Command::Type(kind) => Action::Reply(Reply::TypeSet(kind)),
            Command::Syst => Action::Reply(Reply::SystemType),
            Command::Noop => Action::Reply(Reply::CommandOk),
            Command::Quit => {
                self.reset();
                Action::Close(Reply::Goodbye)
            }
            Command::Port(endpoint) => {
                self.data_endpoint = Some(endpoint);
                Action::Reply(Reply::PortOk(endpoint))
            }
            Command::Retr(path) => {
                let endpoint = self
                    .data_endpoint
                    .take()
                    .ok_or(OrderingError::BadSequence)?;
                Action::Retrieve { path, endpoint }
            }
        };
        Ok(action)
    }
}
