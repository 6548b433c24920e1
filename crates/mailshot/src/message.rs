//! MIME rendering through `mail-builder`.

use crate::error::{Error, Result};
use mail_builder::MessageBuilder;
use mail_builder::headers::raw::Raw;
use std::collections::BTreeMap;

/// Content type used for every attachment.
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// Borrowed view of the message fields of a sender.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Draft<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub cc: &'a [String],
    pub subject: &'a str,
    pub body: &'a str,
    pub headers: &'a BTreeMap<String, String>,
}

impl Draft<'_> {
    /// Renders the message into a single buffer.
    ///
    /// Bcc never reaches this point; it only exists in the envelope.
    pub(crate) fn render(self, attachments: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>> {
        let mut builder = MessageBuilder::new().from(self.from).subject(self.subject);

        if !self.to.is_empty() {
            builder = builder.to(addresses(self.to));
        }
        if !self.cc.is_empty() {
            builder = builder.cc(addresses(self.cc));
        }
        for (name, value) in self.headers {
            builder = builder.header(name.as_str(), Raw::new(value.as_str()));
        }
        for (name, contents) in attachments {
            builder = builder.attachment(ATTACHMENT_CONTENT_TYPE, name, contents);
        }

        builder
            .text_body(self.body)
            .write_to_vec()
            .map_err(Error::Assembly)
    }
}

fn addresses(list: &[String]) -> Vec<&str> {
    list.iter().map(String::as_str).collect()
}
