//! Attachment bookkeeping.
//!
//! Streams are opened eagerly and read once, when the message is built.
//! After that every handle is dropped; the name stays registered with empty
//! contents, so a second send carries the same attachment names but no data.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

type Stream = Box<dyn Read + Send>;

enum Source {
    Open(Stream),
    Consumed,
}

/// Attachment streams keyed by display name.
///
/// Adding a second attachment under an existing name replaces the first.
#[derive(Default)]
pub struct Attachments {
    entries: BTreeMap<String, Source>,
}

impl std::fmt::Debug for Attachments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, source)| {
                let state = match source {
                    Source::Open(_) => "open",
                    Source::Consumed => "consumed",
                };
                (name, state)
            }))
            .finish()
    }
}

impl Attachments {
    /// Opens the file at `path` and registers it under its base name.
    ///
    /// Returns the name it was registered under.
    ///
    /// # Errors
    ///
    /// Returns the error from opening the file; nothing is registered then.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> io::Result<String> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path.file_name().map_or_else(
            || path.to_string_lossy().into_owned(),
            |name| name.to_string_lossy().into_owned(),
        );
        self.add_reader(name.clone(), file);
        Ok(name)
    }

    /// Registers an arbitrary stream under `name`.
    pub fn add_reader(&mut self, name: impl Into<String>, reader: impl Read + Send + 'static) {
        self.entries
            .insert(name.into(), Source::Open(Box::new(reader)));
    }

    /// Registered names, in the order they are attached to the message.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true once the stream registered under `name` has been read.
    #[must_use]
    pub fn is_consumed(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Source::Consumed))
    }

    /// Reads every stream to the end and releases its handle.
    ///
    /// All handles are detached before reading starts, so they are dropped
    /// even when one of the reads fails.
    pub(crate) fn read_all(&mut self) -> Result<Vec<(String, Vec<u8>)>> {
        let detached: Vec<(String, Option<Stream>)> = self
            .entries
            .iter_mut()
            .map(|(name, source)| {
                let stream = match std::mem::replace(source, Source::Consumed) {
                    Source::Open(stream) => Some(stream),
                    Source::Consumed => None,
                };
                (name.clone(), stream)
            })
            .collect();

        let mut contents = Vec::with_capacity(detached.len());
        for (name, stream) in detached {
            let mut bytes = Vec::new();
            if let Some(mut stream) = stream {
                if let Err(source) = stream.read_to_end(&mut bytes) {
                    return Err(Error::AttachmentRead { name, source });
                }
            }
            contents.push((name, bytes));
        }
        Ok(contents)
    }
}
