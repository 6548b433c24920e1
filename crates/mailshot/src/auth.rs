//! Authentication strategy selection.

use crate::error::{Error, Result};
use crate::transport::Transport;
use mailshot_smtp::{Authenticator, LoginAuth, PlainAuth};

/// The three mutually exclusive ways a sender authenticates.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// No authentication at all.
    Anonymous,
    /// LOGIN challenge/response.
    Login(LoginAuth),
    /// PLAIN, bound to the configured host.
    Plain(PlainAuth),
}

/// What happened during the authentication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Anonymous sender, nothing was attempted.
    Skipped,
    /// The server did not advertise AUTH, so the authenticator was never run.
    Unadvertised,
    /// The server accepted the credentials.
    Authenticated,
}

impl AuthStrategy {
    /// Picks the strategy from the sender's flags. `anonymous` overrides
    /// everything else; `login_auth` picks LOGIN over the default PLAIN.
    #[must_use]
    pub fn select(anonymous: bool, login_auth: bool, username: &str, password: &str, host: &str) -> Self {
        match (anonymous, login_auth) {
            (true, _) => Self::Anonymous,
            (false, true) => Self::Login(LoginAuth::new(username, password)),
            (false, false) => Self::Plain(PlainAuth::new(username, password, host)),
        }
    }

    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "Anonymous",
            Self::Login(_) => "Login Auth",
            Self::Plain(_) => "Plain Auth",
        }
    }

    /// Runs the strategy against an open transport.
    ///
    /// Authentication is only attempted when the server advertises AUTH;
    /// otherwise the phase is skipped without error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] naming the authenticator if the exchange fails.
    pub async fn authenticate<T: Transport>(&mut self, transport: &mut T) -> Result<AuthOutcome> {
        let name = self.name();
        let authenticator: &mut dyn Authenticator = match self {
            Self::Anonymous => return Ok(AuthOutcome::Skipped),
            Self::Login(auth) => auth,
            Self::Plain(auth) => auth,
        };

        if !transport.extension("AUTH") {
            return Ok(AuthOutcome::Unadvertised);
        }

        transport
            .auth(authenticator)
            .await
            .map_err(|source| Error::Auth {
                mechanism: name,
                source,
            })?;
        Ok(AuthOutcome::Authenticated)
    }
}
