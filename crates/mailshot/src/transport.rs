//! The capability set a [`Sender`](crate::Sender) drives.
//!
//! The sender never frames SMTP itself; it calls these operations in order
//! and wraps their errors with the phase that failed. [`SmtpDialer`] plugs in
//! the real client from `mailshot-smtp`.

use crate::tls::TlsSettings;
use mailshot_smtp::{Authenticator, Client, Result};
use std::future::Future;

/// An open SMTP session.
///
/// Dropping the transport releases the connection.
pub trait Transport: Send {
    /// Greets the server as `local_name`.
    fn hello(&mut self, local_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Reports whether the server advertised the extension `keyword`.
    fn extension(&self, keyword: &str) -> bool;

    /// Upgrades the session to TLS in place.
    fn start_tls(&mut self, tls: &TlsSettings) -> impl Future<Output = Result<()>> + Send;

    /// Runs the SASL exchange of `auth`.
    fn auth(&mut self, auth: &mut dyn Authenticator) -> impl Future<Output = Result<()>> + Send;

    /// Declares the envelope sender.
    fn mail(&mut self, from: &str) -> impl Future<Output = Result<()>> + Send;

    /// Declares one envelope recipient.
    fn rcpt(&mut self, to: &str) -> impl Future<Output = Result<()>> + Send;

    /// Opens the message data channel.
    fn data(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Writes message bytes into the open data channel.
    fn write_data(&mut self, message: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Closes the data channel; the server accepts or rejects the message.
    fn close_data(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Ends the session.
    fn quit(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens transports.
pub trait Dialer: Sync {
    /// Transport produced by this dialer.
    type Transport: Transport;

    /// Connects to `host:port` and reads the server greeting.
    fn dial(&self, host: &str, port: u16) -> impl Future<Output = Result<Self::Transport>> + Send;
}

/// Dials real SMTP servers over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpDialer;

impl Dialer for SmtpDialer {
    type Transport = Client;

    async fn dial(&self, host: &str, port: u16) -> Result<Client> {
        Client::connect(host, port).await
    }
}

impl Transport for Client {
    async fn hello(&mut self, local_name: &str) -> Result<()> {
        Self::hello(self, local_name).await
    }

    fn extension(&self, keyword: &str) -> bool {
        Self::extension(self, keyword)
    }

    async fn start_tls(&mut self, tls: &TlsSettings) -> Result<()> {
        self.starttls(tls.client_config(), tls.server_name()).await
    }

    async fn auth(&mut self, auth: &mut dyn Authenticator) -> Result<()> {
        Self::auth(self, auth).await
    }

    async fn mail(&mut self, from: &str) -> Result<()> {
        Self::mail(self, from).await
    }

    async fn rcpt(&mut self, to: &str) -> Result<()> {
        Self::rcpt(self, to).await
    }

    async fn data(&mut self) -> Result<()> {
        Self::data(self).await
    }

    async fn write_data(&mut self, message: &[u8]) -> Result<()> {
        Self::write_data(self, message).await
    }

    async fn close_data(&mut self) -> Result<()> {
        Self::close_data(self).await
    }

    async fn quit(&mut self) -> Result<()> {
        Self::quit(self).await
    }
}
