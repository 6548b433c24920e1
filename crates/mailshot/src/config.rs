//! Serializable sender configuration.

use crate::error::Result;
use crate::sender::Sender;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default SMTP submission port.
pub const DEFAULT_PORT: u16 = 25;

/// Every knob of a [`Sender`] in a form that can be loaded from JSON.
///
/// All keys are optional:
///
/// ```json
/// {
///   "host": "smtp.example.com",
///   "port": 587,
///   "username": "bot",
///   "password": "hunter2",
///   "from": "bot@example.com",
///   "to": ["ops@example.com"],
///   "subject": "nightly build",
///   "body": "all green",
///   "attachments": ["/tmp/build.log"]
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Emit phase transitions and the rendered message.
    pub debug: bool,
    /// Name sent in the greeting; "localhost" when unset.
    pub host_origin: Option<String>,
    /// PEM certificate used as the only trust anchor.
    pub ca_cert: Option<String>,
    /// Accept any server certificate.
    pub skip_ssl_validation: bool,
    /// Send without authenticating.
    pub anonymous: bool,
    /// Use LOGIN instead of PLAIN.
    pub login_auth: bool,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Envelope and header sender.
    pub from: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Extra headers written verbatim.
    pub headers: BTreeMap<String, String>,
    /// Files to attach.
    pub attachments: Vec<PathBuf>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            debug: false,
            host_origin: None,
            ca_cert: None,
            skip_ssl_validation: false,
            anonymous: false,
            login_auth: false,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            body: String::new(),
            headers: BTreeMap::new(),
            attachments: Vec::new(),
        }
    }
}

impl std::fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("host_origin", &self.host_origin)
            .field("ca_cert", &self.ca_cert.as_ref().map(|_| "<pem>"))
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("anonymous", &self.anonymous)
            .field("login_auth", &self.login_auth)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .field("subject", &self.subject)
            .field("headers", &self.headers)
            .field("attachments", &self.attachments)
            .finish_non_exhaustive()
    }
}

impl SenderConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read, or
    /// [`Error::Config`](crate::Error::Config) if it is not valid JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Builds a sender, opening every attachment.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the first attachment that cannot be opened.
    pub fn into_sender(self, sink: impl Into<tracing::Dispatch>) -> Result<Sender> {
        let mut sender = Sender::new(self.host, self.port, self.debug, sink);
        sender.host_origin = self.host_origin.filter(|origin| !origin.is_empty());
        sender.ca_cert = self.ca_cert.filter(|pem| !pem.is_empty());
        sender.skip_ssl_validation = self.skip_ssl_validation;
        sender.anonymous = self.anonymous;
        sender.login_auth = self.login_auth;
        sender.username = self.username;
        sender.password = self.password;
        sender.from = self.from;
        sender.to = self.to;
        sender.cc = self.cc;
        sender.bcc = self.bcc;
        sender.subject = self.subject;
        sender.body = self.body;
        sender.headers = self.headers;
        for path in &self.attachments {
            sender.add_attachment(path)?;
        }
        Ok(sender)
    }
}
