//! SASL authenticators for the SMTP `AUTH` exchange.
//!
//! Implements:
//! - PLAIN (RFC 4616), bound to the host the credentials belong to
//! - LOGIN (draft-murchison-sasl-login), the legacy username/password prompt
//!
//! The [`Client`](crate::Client) drives the exchange: it asks the
//! authenticator for the mechanism and initial response, then feeds every
//! `334` challenge (already base64-decoded) to [`Authenticator::next`].

use crate::error::{Error, Result};
use crate::types::AuthMechanism;

/// What the client knows about the server when authentication starts.
#[derive(Debug, Clone, Copy)]
pub struct ServerContext<'a> {
    /// Host name the connection was dialed with.
    pub name: &'a str,
    /// Whether the connection is protected by TLS.
    pub tls: bool,
}

/// A SASL client mechanism.
pub trait Authenticator: Send {
    /// Begins the exchange, returning the mechanism to announce and the
    /// optional initial response (raw bytes, the client encodes them).
    ///
    /// # Errors
    ///
    /// Returns an error to abort before anything is sent to the server.
    fn start(&mut self, server: &ServerContext<'_>) -> Result<(AuthMechanism, Option<Vec<u8>>)>;

    /// Answers one server challenge.
    ///
    /// # Errors
    ///
    /// Returns an error when the challenge cannot be answered; the client
    /// then cancels the exchange.
    fn next(&mut self, challenge: &[u8]) -> Result<Vec<u8>>;
}

fn is_localhost(name: &str) -> bool {
    matches!(name, "localhost" | "127.0.0.1" | "::1")
}

/// PLAIN authenticator.
///
/// Credentials are only released over TLS (or to localhost) and only to the
/// host they were created for.
#[derive(Clone)]
pub struct PlainAuth {
    identity: String,
    username: String,
    password: String,
    host: String,
}

impl PlainAuth {
    /// Creates a PLAIN authenticator with an empty authorization identity.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            identity: String::new(),
            username: username.into(),
            password: password.into(),
            host: host.into(),
        }
    }

    /// Sets the authorization identity to act as.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Host the credentials are bound to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Debug for PlainAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainAuth")
            .field("identity", &self.identity)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

impl Authenticator for PlainAuth {
    fn start(&mut self, server: &ServerContext<'_>) -> Result<(AuthMechanism, Option<Vec<u8>>)> {
        if !server.tls && !is_localhost(server.name) {
            return Err(Error::Auth("unencrypted connection".into()));
        }
        if server.name != self.host {
            return Err(Error::Auth(format!(
                "wrong host name: connected to {}, credentials are for {}",
                server.name, self.host
            )));
        }

        let response = format!("{}\0{}\0{}", self.identity, self.username, self.password);
        Ok((AuthMechanism::Plain, Some(response.into_bytes())))
    }

    fn next(&mut self, _challenge: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Auth("unexpected server challenge for PLAIN".into()))
    }
}

/// LOGIN authenticator.
#[derive(Clone)]
pub struct LoginAuth {
    username: String,
    password: String,
}

impl LoginAuth {
    /// Creates a LOGIN authenticator.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Authenticator for LoginAuth {
    fn start(&mut self, _server: &ServerContext<'_>) -> Result<(AuthMechanism, Option<Vec<u8>>)> {
        Ok((AuthMechanism::Login, None))
    }

    fn next(&mut self, challenge: &[u8]) -> Result<Vec<u8>> {
        let prompt = String::from_utf8_lossy(challenge).trim().to_ascii_lowercase();
        if prompt.starts_with("username") {
            Ok(self.username.clone().into_bytes())
        } else if prompt.starts_with("password") {
            Ok(self.password.clone().into_bytes())
        } else {
            Err(Error::Auth(format!(
                "unknown LOGIN challenge: {}",
                String::from_utf8_lossy(challenge)
            )))
        }
    }
}
