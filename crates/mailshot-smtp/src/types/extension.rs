//! SMTP extension types.

/// SMTP extensions discovered from EHLO response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication, whatever mechanisms are listed
    Auth,
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// Any other keyword, kept verbatim (uppercased keyword first)
    Other(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    ///
    /// Parameters after the keyword are dropped.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(keyword) = line.split_whitespace().next() else {
            return Self::Other(String::new());
        };

        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            // Some servers still advertise the pre-standard "AUTH=PLAIN LOGIN" form
            upper if upper == "AUTH" || upper.starts_with("AUTH=") => Self::Auth,
            "8BITMIME" => Self::EightBitMime,
            upper => Self::Other(upper.to_string()),
        }
    }

    /// Returns the EHLO keyword this extension was advertised under.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::StartTls => "STARTTLS",
            Self::Auth => "AUTH",
            Self::EightBitMime => "8BITMIME",
            Self::Other(keyword) => keyword,
        }
    }
}

/// SASL mechanism announced in the `AUTH` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication
    Plain,
    /// LOGIN - legacy plaintext
    Login,
}

impl AuthMechanism {
    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}
