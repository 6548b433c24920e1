//! SMTP connection management.

mod client;
mod dot;
mod stream;

pub use client::Client;
pub use dot::DotStuffer;
pub use stream::{AsyncIo, SmtpStream, connect};

use crate::types::Extension;
use std::collections::HashSet;

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks for an extension by its EHLO keyword, ignoring parameters and
    /// case.
    #[must_use]
    pub fn has_extension(&self, keyword: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.keyword().eq_ignore_ascii_case(keyword))
    }
}
