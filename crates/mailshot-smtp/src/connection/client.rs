//! SMTP client session.

use super::dot::DotStuffer;
use super::{ServerInfo, SmtpStream, connect};
use crate::auth::{Authenticator, ServerContext};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustls::ClientConfig;
use std::sync::Arc;

/// One SMTP session over one connection.
///
/// Commands are issued strictly in call order; the client never pipelines or
/// retries. Dropping the client closes the connection.
#[derive(Debug)]
pub struct Client {
    stream: SmtpStream,
    server_name: String,
    local_name: Option<String>,
    server_info: ServerInfo,
    data: Option<DotStuffer>,
}

impl Client {
    /// Dials `hostname:port` and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the greeting is not `220`.
    pub async fn connect(hostname: &str, port: u16) -> Result<Self> {
        let stream = connect(hostname, port).await?;
        Self::from_stream(stream, hostname).await
    }

    /// Creates a client from a stream and reads the server greeting.
    ///
    /// `server_name` is the host the stream was opened to; authenticators use
    /// it to decide whether credentials may be sent.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server is not
    /// ready.
    pub async fn from_stream(mut stream: SmtpStream, server_name: impl Into<String>) -> Result<Self> {
        let greeting = read_reply(&mut stream)
            .await?
            .expect(ReplyCode::SERVICE_READY)?;

        // First word after the code is the server's own name
        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_name: server_name.into(),
            local_name: None,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            data: None,
        })
    }

    /// Returns the server information gathered so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once the session runs over TLS.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }

    /// Reports whether the server advertised the extension `keyword`
    /// (case-insensitive) in its EHLO reply.
    #[must_use]
    pub fn extension(&self, keyword: &str) -> bool {
        self.server_info.has_extension(keyword)
    }

    /// Greets the server as `local_name`: EHLO first, HELO if the server
    /// rejects EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if a greeting was already sent, the name contains a
    /// line break, or both greetings are rejected.
    pub async fn hello(&mut self, local_name: &str) -> Result<()> {
        if self.local_name.is_some() {
            return Err(Error::InvalidState("greeting already sent".into()));
        }
        if local_name.contains(['\r', '\n']) {
            return Err(Error::Protocol(format!(
                "Invalid local name: {local_name:?}"
            )));
        }
        self.local_name = Some(local_name.to_string());

        match self.ehlo(local_name).await {
            Err(Error::SmtpError { code, .. }) => {
                tracing::trace!(code, "EHLO rejected, falling back to HELO");
                self.helo(local_name).await
            }
            other => other,
        }
    }

    async fn ehlo(&mut self, local_name: &str) -> Result<()> {
        let reply = self
            .send_command(Command::Ehlo {
                hostname: local_name.to_string(),
            })
            .await?
            .success()?;

        // First line is the greeting, the rest are extension keywords
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(())
    }

    async fn helo(&mut self, local_name: &str) -> Result<()> {
        self.send_command(Command::Helo {
            hostname: local_name.to_string(),
        })
        .await?
        .success()?;

        self.server_info.extensions.clear();
        Ok(())
    }

    /// Upgrades the connection with STARTTLS and greets the server again.
    ///
    /// # Errors
    ///
    /// Returns an error if no greeting was sent yet, the server refuses
    /// STARTTLS, or the handshake fails.
    pub async fn starttls(&mut self, config: Arc<ClientConfig>, server_name: &str) -> Result<()> {
        let local_name = self
            .local_name
            .clone()
            .ok_or_else(|| Error::InvalidState("STARTTLS before greeting".into()))?;

        self.send_command(Command::StartTls)
            .await?
            .expect(ReplyCode::SERVICE_READY)?;

        let plain = std::mem::replace(&mut self.stream, SmtpStream::Closed);
        self.stream = plain.upgrade_to_tls(config, server_name).await?;

        // Capabilities may differ once encrypted
        self.ehlo(&local_name).await
    }

    /// Runs a SASL exchange with `auth`.
    ///
    /// # Errors
    ///
    /// Returns an error if the authenticator refuses to start or to answer a
    /// challenge, or if the server rejects the credentials.
    pub async fn auth(&mut self, auth: &mut dyn Authenticator) -> Result<()> {
        let (mechanism, initial) = auth.start(&ServerContext {
            name: &self.server_name,
            tls: self.stream.is_tls(),
        })?;

        let mut reply = self
            .send_command(Command::Auth {
                mechanism,
                initial_response: initial.map(|bytes| STANDARD.encode(bytes)),
            })
            .await?;

        loop {
            if reply.is_success() {
                return Ok(());
            }
            if reply.code != ReplyCode::AUTH_CONTINUE {
                return Err(reply.into_error());
            }

            let answer = STANDARD
                .decode(reply.message_text().trim())
                .map_err(|e| Error::Protocol(format!("Invalid AUTH challenge: {e}")))
                .and_then(|challenge| auth.next(&challenge));

            match answer {
                Ok(bytes) => {
                    reply = self
                        .send_command(Command::AuthResponse(STANDARD.encode(bytes)))
                        .await?;
                }
                Err(err) => {
                    // Cancel so the session stays usable; the cancel reply
                    // itself carries no information.
                    self.send_command(Command::AuthResponse("*".into())).await?;
                    return Err(err);
                }
            }
        }
    }

    /// Issues `MAIL FROM`, requesting `BODY=8BITMIME` when available.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or rejected.
    pub async fn mail(&mut self, from: &str) -> Result<()> {
        let cmd = Command::MailFrom {
            from: Address::new(from)?,
            body: self
                .server_info
                .supports(&Extension::EightBitMime)
                .then_some("8BITMIME"),
        };
        self.send_command(cmd).await?.success()?;
        Ok(())
    }

    /// Issues `RCPT TO` for one recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or rejected.
    pub async fn rcpt(&mut self, to: &str) -> Result<()> {
        let cmd = Command::RcptTo {
            to: Address::new(to)?,
        };
        self.send_command(cmd).await?.success()?;
        Ok(())
    }

    /// Issues `DATA` and opens the message body channel.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `354`.
    pub async fn data(&mut self) -> Result<()> {
        self.send_command(Command::Data)
            .await?
            .expect(ReplyCode::START_DATA)?;
        self.data = Some(DotStuffer::new());
        Ok(())
    }

    /// Writes message bytes into the open body channel.
    ///
    /// Line endings are normalized to CRLF and leading dots are stuffed.
    ///
    /// # Errors
    ///
    /// Returns an error if no body channel is open or the write fails.
    pub async fn write_data(&mut self, message: &[u8]) -> Result<()> {
        let mut encoded = Vec::new();
        match self.data.as_mut() {
            Some(stuffer) => stuffer.encode(message, &mut encoded),
            None => return Err(Error::InvalidState("DATA not started".into())),
        }
        self.stream.write_all(&encoded).await
    }

    /// Terminates the body and waits for the server to accept the message.
    ///
    /// # Errors
    ///
    /// Returns an error if no body channel is open or the server rejects the
    /// message.
    pub async fn close_data(&mut self) -> Result<()> {
        let stuffer = self
            .data
            .take()
            .ok_or_else(|| Error::InvalidState("DATA not started".into()))?;

        let mut terminator = Vec::with_capacity(5);
        stuffer.finish(&mut terminator);
        self.stream.write_all(&terminator).await?;

        let reply = read_reply(&mut self.stream).await?;
        tracing::trace!(code = reply.code.as_u16(), "message data accepted");
        reply.success()?;
        Ok(())
    }

    /// Sends QUIT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge.
    pub async fn quit(&mut self) -> Result<()> {
        self.send_command(Command::Quit).await?.success()?;
        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::trace!(command = cmd.verb(), "sending");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::trace!(command = cmd.verb(), code = reply.code.as_u16(), "reply");
        Ok(reply)
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}
