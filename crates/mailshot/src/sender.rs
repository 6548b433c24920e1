//! The single-message sender.

use crate::attachment::Attachments;
use crate::auth::AuthStrategy;
use crate::error::{Error, Result};
use crate::message::Draft;
use crate::tls::TlsSettings;
use crate::transport::{Dialer, SmtpDialer, Transport};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::Path;
use tracing::Dispatch;
use tracing::instrument::WithSubscriber;

/// Greeting name used when no host origin is configured.
pub const DEFAULT_ORIGIN: &str = "localhost";

/// Emits a debug event only when the sender's debug flag is set.
macro_rules! phase {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            tracing::debug!($($arg)+);
        }
    };
}

/// Sends one email to one SMTP server.
///
/// Connection target and logging are fixed at construction; everything
/// else is a public field set before calling [`send`](Self::send).
pub struct Sender {
    host: String,
    port: u16,
    debug: bool,
    sink: Dispatch,
    attachments: Attachments,

    /// Name sent in the greeting. Defaults to [`DEFAULT_ORIGIN`].
    pub host_origin: Option<String>,
    /// PEM certificate used as the only trust anchor for STARTTLS.
    pub ca_cert: Option<String>,
    /// Send without authenticating.
    pub anonymous: bool,
    /// Use LOGIN instead of PLAIN.
    pub login_auth: bool,
    /// Accept any server certificate.
    pub skip_ssl_validation: bool,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Sender address.
    pub from: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients; never written into the headers.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Extra headers, written verbatim.
    pub headers: BTreeMap<String, String>,
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("attachments", &self.attachments)
            .field("host_origin", &self.host_origin)
            .field("anonymous", &self.anonymous)
            .field("login_auth", &self.login_auth)
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl Sender {
    /// Creates a sender for `host:port`.
    ///
    /// When `debug` is set, every phase and the rendered message are logged
    /// at debug level to `sink`.
    pub fn new(host: impl Into<String>, port: u16, debug: bool, sink: impl Into<Dispatch>) -> Self {
        Self {
            host: host.into(),
            port,
            debug,
            sink: sink.into(),
            attachments: Attachments::default(),
            host_origin: None,
            ca_cert: None,
            anonymous: false,
            login_auth: false,
            skip_ssl_validation: false,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            body: String::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Server host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Whether debug logging is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Registered attachments.
    #[must_use]
    pub const fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    /// Opens the file at `path` and attaches it under its base name.
    ///
    /// The file stays open until the next send reads it.
    ///
    /// # Errors
    ///
    /// Returns the error from opening the file unchanged.
    pub fn add_attachment(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        self.attachments.add_path(path)?;
        Ok(())
    }

    /// Attaches the contents of `reader` under `name`.
    pub fn add_attachment_reader(&mut self, name: impl Into<String>, reader: impl Read + Send + 'static) {
        self.attachments.add_reader(name, reader);
    }

    /// Envelope recipients in the order they are declared: To, Cc, then Bcc.
    ///
    /// Duplicates are kept.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    /// TLS settings used if the server offers STARTTLS.
    #[must_use]
    pub fn tls_settings(&self) -> TlsSettings {
        TlsSettings::derive(
            &self.host,
            self.skip_ssl_validation,
            self.ca_cert.as_deref(),
        )
    }

    /// Authentication strategy selected by the current flags.
    #[must_use]
    pub fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::select(
            self.anonymous,
            self.login_auth,
            &self.username,
            &self.password,
            &self.host,
        )
    }

    /// Name sent in the greeting.
    #[must_use]
    pub fn origin(&self) -> &str {
        self.host_origin
            .as_deref()
            .filter(|origin| !origin.is_empty())
            .unwrap_or(DEFAULT_ORIGIN)
    }

    /// Sends the message over a new TCP connection.
    ///
    /// # Errors
    ///
    /// Returns the first failure, wrapped with the phase it happened in.
    pub async fn send(&mut self) -> Result<()> {
        self.send_via(&SmtpDialer).await
    }

    /// Sends the message over a transport opened by `dialer`.
    ///
    /// # Errors
    ///
    /// Returns the first failure, wrapped with the phase it happened in.
    pub async fn send_via<D: Dialer>(&mut self, dialer: &D) -> Result<()> {
        let sink = self.sink.clone();
        self.deliver(dialer).with_subscriber(sink).await
    }

    /// Sends the message, blocking the calling thread until done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called from inside a tokio runtime or
    /// if no runtime can be started, otherwise the same errors as
    /// [`send`](Self::send).
    pub fn send_blocking(&mut self) -> Result<()> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Runtime(io::Error::other(
                "send_blocking called from inside an async runtime; use send instead",
            )));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        runtime.block_on(self.send())
    }

    async fn deliver<D: Dialer>(&mut self, dialer: &D) -> Result<()> {
        let debug = self.debug;

        let attachments = self.attachments.read_all()?;
        let message = Draft {
            from: &self.from,
            to: &self.to,
            cc: &self.cc,
            subject: &self.subject,
            body: &self.body,
            headers: &self.headers,
        }
        .render(attachments)?;

        let addr = format!("{}:{}", self.host, self.port);
        phase!(debug, %addr, "dialing SMTP server");
        let mut transport = dialer
            .dial(&self.host, self.port)
            .await
            .map_err(|source| Error::Dial { addr, source })?;

        let origin = self.origin();
        phase!(debug, origin, "sending hello");
        transport.hello(origin).await.map_err(|source| Error::Hello {
            origin: origin.to_string(),
            source,
        })?;

        if transport.extension("STARTTLS") {
            let tls = self.tls_settings();
            phase!(
                debug,
                server_name = tls.server_name(),
                skip_verification = tls.skips_verification(),
                "starting TLS"
            );
            transport.start_tls(&tls).await.map_err(Error::StartTls)?;
        } else {
            phase!(debug, "server does not offer STARTTLS, continuing unencrypted");
        }

        let mut strategy = self.auth_strategy();
        let outcome = strategy.authenticate(&mut transport).await?;
        phase!(debug, mechanism = strategy.name(), ?outcome, "authentication finished");

        phase!(debug, from = %self.from, "setting sender");
        transport.mail(&self.from).await.map_err(Error::MailFrom)?;

        for address in self.recipients() {
            phase!(debug, address, "adding recipient");
            transport
                .rcpt(address)
                .await
                .map_err(|source| Error::Recipient {
                    address: address.to_string(),
                    source,
                })?;
        }

        phase!(debug, "opening data channel");
        transport.data().await.map_err(Error::Data)?;

        phase!(
            debug,
            bytes = message.len(),
            contents = %String::from_utf8_lossy(&message),
            "writing message"
        );
        transport.write_data(&message).await.map_err(Error::Write)?;
        transport.close_data().await.map_err(Error::Close)?;

        phase!(debug, "quitting");
        transport.quit().await.map_err(Error::Quit)?;
        phase!(debug, "message sent");
        Ok(())
    }
}
