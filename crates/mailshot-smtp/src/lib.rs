//! # mailshot-smtp
//!
//! The SMTP client behind `mailshot`: one connection, one session, commands
//! issued strictly in order.
//!
//! ## Features
//!
//! - **Greeting**: EHLO with HELO fallback, extension discovery
//! - **STARTTLS**: in-place upgrade with a caller-supplied rustls config
//! - **Authentication**: SASL exchange driven by an [`Authenticator`]
//!   (PLAIN and LOGIN provided)
//! - **Envelope and data**: MAIL FROM, RCPT TO, DATA with CRLF normalization
//!   and dot-stuffing, QUIT
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailshot_smtp::{Client, PlainAuth};
//!
//! #[tokio::main]
//! async fn main() -> mailshot_smtp::Result<()> {
//!     let mut client = Client::connect("localhost", 25).await?;
//!     client.hello("client.example.com").await?;
//!
//!     if client.extension("AUTH") {
//!         let mut auth = PlainAuth::new("user", "password", "localhost");
//!         client.auth(&mut auth).await?;
//!     }
//!
//!     client.mail("sender@example.com").await?;
//!     client.rcpt("recipient@example.com").await?;
//!     client.data().await?;
//!     client.write_data(b"Subject: Test\r\n\r\nHello, World!\r\n").await?;
//!     client.close_data().await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`auth`]: SASL authenticators
//! - [`command`]: SMTP command builders
//! - [`connection`]: Streams and the session client
//! - [`parser`]: Response parser
//! - [`types`]: Core SMTP types (addresses, extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use auth::{Authenticator, LoginAuth, PlainAuth, ServerContext};
pub use connection::{Client, ServerInfo, SmtpStream};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyClass, ReplyCode};

/// Re-exported so callers can build the config passed to
/// [`Client::starttls`] without naming rustls themselves.
pub use rustls::ClientConfig;
