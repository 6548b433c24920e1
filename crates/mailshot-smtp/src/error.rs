//! Errors raised by the SMTP client.

use crate::types::{ReplyClass, ReplyCode};
use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong during a session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection failed or was closed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The TLS handshake or session failed.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The server answered with a non-success code.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code, e.g. 550.
        code: u16,
        /// Reply text, one line per server line.
        message: String,
    },

    /// The server sent something that is not a valid reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A mailbox could not be used in MAIL FROM or RCPT TO.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The authenticator refused to continue.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A command was issued out of order.
    #[error("Invalid state for operation: {0}")]
    InvalidState(String),
}

impl Error {
    /// Builds an error from a reply code and text.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Reply code, when the error came from the server.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::SmtpError { code, .. } => Some(*code),
            _ => None,
        }
    }

    const fn class(&self) -> Option<ReplyClass> {
        match self {
            Self::SmtpError { code, .. } => Some(ReplyCode::new(*code).class()),
            _ => None,
        }
    }

    /// Returns true for 5xx rejections; repeating the command will not help.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.class(), Some(ReplyClass::Permanent))
    }

    /// Returns true for 4xx rejections; the server asked to try later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.class(), Some(ReplyClass::Transient))
    }
}
