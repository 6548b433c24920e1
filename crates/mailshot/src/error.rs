//! Error types for sending.

use std::io;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of a send failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The sender could not be configured (attachment, config file).
    Configuration,
    /// The message could not be rendered.
    Assembly,
    /// The server could not be reached or the connection could not be secured.
    Connectivity,
    /// The server rejected a command.
    Protocol,
    /// The server rejected the credentials.
    Authentication,
}

/// Errors that can occur while configuring a sender or sending a message.
///
/// Every send-phase variant names the phase that failed and keeps the
/// transport error as its source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening an attachment failed; the I/O error is passed through as is.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading an attachment's contents failed.
    #[error("Unable to read attachment {name}: {source}")]
    AttachmentRead {
        /// Attachment display name.
        name: String,
        /// Underlying read error.
        source: io::Error,
    },

    /// The message builder could not render the message.
    #[error("Unable to get mime buffer: {0}")]
    Assembly(#[source] io::Error),

    /// Connecting to the server failed.
    #[error("Error dialing SMTP server {addr}: {source}")]
    Dial {
        /// `host:port` that was dialed.
        addr: String,
        /// Transport error.
        source: mailshot_smtp::Error,
    },

    /// The greeting was rejected.
    #[error(
        "Unable to connect with hello with host name {origin}, try setting the host origin: {source}"
    )]
    Hello {
        /// Name sent in the greeting.
        origin: String,
        /// Transport error.
        source: mailshot_smtp::Error,
    },

    /// STARTTLS or the TLS handshake failed.
    #[error("Unable to start TLS: {0}")]
    StartTls(#[source] mailshot_smtp::Error),

    /// The server rejected the credentials.
    #[error("Unable to auth using type {mechanism}: {source}")]
    Auth {
        /// Authenticator that was attempted ("Plain Auth" or "Login Auth").
        mechanism: &'static str,
        /// Transport error.
        source: mailshot_smtp::Error,
    },

    /// The sender address was rejected.
    #[error("Error setting from: {0}")]
    MailFrom(#[source] mailshot_smtp::Error),

    /// A recipient address was rejected.
    #[error("Error setting recipient {address}: {source}")]
    Recipient {
        /// The rejected recipient.
        address: String,
        /// Transport error.
        source: mailshot_smtp::Error,
    },

    /// The server refused to open the data channel.
    #[error("Error getting data: {0}")]
    Data(#[source] mailshot_smtp::Error),

    /// Writing the message into the data channel failed.
    #[error("Error writing message data: {0}")]
    Write(#[source] mailshot_smtp::Error),

    /// Closing the data channel failed (message not accepted).
    #[error("Error closing message data: {0}")]
    Close(#[source] mailshot_smtp::Error),

    /// QUIT failed after the message was accepted.
    #[error("Error quitting: {0}")]
    Quit(#[source] mailshot_smtp::Error),

    /// A blocking send could not get a runtime of its own.
    #[error("Unable to start runtime: {0}")]
    Runtime(#[source] io::Error),
}

impl Error {
    /// Returns the class of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Config(_) => ErrorKind::Configuration,
            Self::AttachmentRead { .. } | Self::Assembly(_) => ErrorKind::Assembly,
            Self::Dial { .. } | Self::StartTls(_) | Self::Runtime(_) => ErrorKind::Connectivity,
            Self::Auth { .. } => ErrorKind::Authentication,
            Self::Hello { .. }
            | Self::MailFrom(_)
            | Self::Recipient { .. }
            | Self::Data(_)
            | Self::Write(_)
            | Self::Close(_)
            | Self::Quit(_) => ErrorKind::Protocol,
        }
    }

    /// Returns true when the failure happened after the server accepted the
    /// message, so the mail was delivered despite the error.
    #[must_use]
    pub const fn is_after_delivery(&self) -> bool {
        matches!(self, Self::Quit(_))
    }
}
