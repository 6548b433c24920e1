//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::ClientConfig;
use rustls::pki_types::ServerName;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

/// Byte stream an SMTP session can run over.
pub trait AsyncIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncIo for T {}

type BoxedIo = Box<dyn AsyncIo>;

/// SMTP stream (plain or TLS).
pub enum SmtpStream {
    /// Unencrypted connection.
    Plain(BufReader<BoxedIo>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<TlsStream<BoxedIo>>>),
    /// Transient state while the stream is being upgraded.
    Closed,
}

impl std::fmt::Debug for SmtpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Plain(_) => "Plain",
            Self::Tls(_) => "Tls",
            Self::Closed => "Closed",
        };
        f.debug_tuple("SmtpStream").field(&kind).finish()
    }
}

impl SmtpStream {
    /// Wraps any async byte stream as an unencrypted SMTP stream.
    pub fn new(io: impl AsyncIo + 'static) -> Self {
        Self::Plain(BufReader::new(Box::new(io)))
    }

    /// Returns true once the stream is protected by TLS.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Reads one line, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the peer closed the connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match self {
            Self::Plain(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
            Self::Closed => return Err(not_connected()),
        };
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )
            .into());
        }
        Ok(line.trim_end().to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Plain(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Closed => return Err(not_connected()),
        }
        Ok(())
    }

    /// Upgrades a plain stream to TLS using the given client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not plain, the server name is
    /// invalid, or the TLS handshake fails.
    pub async fn upgrade_to_tls(self, config: Arc<ClientConfig>, server_name: &str) -> Result<Self> {
        let io = match self {
            Self::Plain(reader) => {
                if !reader.buffer().is_empty() {
                    return Err(Error::Protocol(
                        "Server sent data before the TLS handshake".into(),
                    ));
                }
                reader.into_inner()
            }
            Self::Tls(_) => return Err(Error::Protocol("Already using TLS".into())),
            Self::Closed => return Err(not_connected()),
        };

        let server_name = ServerName::try_from(server_name.to_string())
            .map_err(|_| Error::Protocol(format!("Invalid hostname: {server_name}")))?;

        let tls_stream = TlsConnector::from(config).connect(server_name, io).await?;
        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }
}

fn not_connected() -> Error {
    io::Error::new(io::ErrorKind::NotConnected, "SMTP stream is closed").into()
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<SmtpStream> {
    let stream = TcpStream::connect((hostname, port)).await?;
    Ok(SmtpStream::new(stream))
}
