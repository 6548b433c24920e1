//! # mailshot
//!
//! Send one email to one SMTP server: greet, upgrade with STARTTLS when the
//! server offers it, authenticate with PLAIN or LOGIN (or not at all), hand
//! over a MIME message with headers and attachments, and quit.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailshot::Sender;
//!
//! #[tokio::main]
//! async fn main() -> mailshot::Result<()> {
//!     let mut sender = Sender::new("smtp.example.com", 587, false, tracing::Dispatch::none());
//!     sender.username = "bot".into();
//!     sender.password = "hunter2".into();
//!     sender.from = "bot@example.com".into();
//!     sender.to = vec!["ops@example.com".into()];
//!     sender.subject = "nightly build".into();
//!     sender.body = "all green".into();
//!     sender.add_attachment("/tmp/build.log")?;
//!
//!     sender.send().await
//! }
//! ```
//!
//! Synchronous callers use [`Sender::send_blocking`]. Configuration can also
//! be loaded from JSON with [`SenderConfig`].
//!
//! ## Modules
//!
//! - [`attachment`]: attachment streams keyed by name
//! - [`auth`]: authentication strategy selection
//! - [`config`]: serializable configuration
//! - [`tls`]: STARTTLS trust settings
//! - [`transport`]: the session operations the sender drives

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod auth;
pub mod config;
mod error;
mod message;
mod sender;
pub mod tls;
pub mod transport;

pub use attachment::Attachments;
pub use auth::{AuthOutcome, AuthStrategy};
pub use config::{DEFAULT_PORT, SenderConfig};
pub use error::{Error, ErrorKind, Result};
pub use sender::{DEFAULT_ORIGIN, Sender};
pub use tls::{TlsSettings, Verification};
pub use transport::{Dialer, SmtpDialer, Transport};

/// Re-exported so transports outside this crate can name authenticators.
pub use mailshot_smtp::Authenticator;
