//! DATA-phase encoding: CRLF normalization and dot-stuffing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// At the first byte of a line.
    Start,
    /// Just wrote a bare `\r`.
    Cr,
    /// Inside a line.
    Body,
}

/// Streaming encoder for the message body sent after `DATA`.
///
/// Bare `\n` becomes `\r\n`, lines starting with `.` get an extra `.`, and
/// [`finish`](Self::finish) appends the `.` terminator line. State carries
/// across calls, so a message can be written in arbitrary chunks.
#[derive(Debug)]
pub struct DotStuffer {
    state: LineState,
}

impl Default for DotStuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DotStuffer {
    /// Creates an encoder positioned at the start of a line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LineState::Start,
        }
    }

    /// Encodes `input`, appending the wire bytes to `out`.
    pub fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len() + input.len() / 64 + 2);
        for &byte in input {
            match byte {
                b'\n' => {
                    if self.state != LineState::Cr {
                        out.push(b'\r');
                    }
                    out.push(b'\n');
                    self.state = LineState::Start;
                }
                b'\r' => {
                    out.push(b'\r');
                    self.state = LineState::Cr;
                }
                b'.' if self.state == LineState::Start => {
                    out.extend_from_slice(b"..");
                    self.state = LineState::Body;
                }
                _ => {
                    out.push(byte);
                    self.state = LineState::Body;
                }
            }
        }
    }

    /// Terminates the last line if needed and appends `.\r\n`.
    pub fn finish(self, out: &mut Vec<u8>) {
        match self.state {
            LineState::Start => {}
            LineState::Cr => out.push(b'\n'),
            LineState::Body => out.extend_from_slice(b"\r\n"),
        }
        out.extend_from_slice(b".\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_all(chunks: &[&[u8]]) -> Vec<u8> {
        let mut stuffer = DotStuffer::new();
        let mut out = Vec::new();
        for chunk in chunks {
            stuffer.encode(chunk, &mut out);
        }
        stuffer.finish(&mut out);
        out
    }

    #[test]
    fn normalizes_bare_newlines() {
        assert_eq!(encode_all(&[b"a\nb\r\nc"]), b"a\r\nb\r\nc\r\n.\r\n");
    }

    #[test]
    fn stuffs_leading_dots_only() {
        assert_eq!(
            encode_all(&[b".hidden\r\nmid.dle\r\n..\r\n"]),
            b"..hidden\r\nmid.dle\r\n...\r\n.\r\n"
        );
    }

    #[test]
    fn state_survives_chunk_boundaries() {
        assert_eq!(encode_all(&[b"line\r", b"\n.dot"]), b"line\r\n..dot\r\n.\r\n");
    }

    #[test]
    fn first_byte_of_message_is_a_line_start() {
        assert_eq!(encode_all(&[b"."]), b"..\r\n.\r\n");
    }

    #[test]
    fn empty_and_terminated_bodies() {
        assert_eq!(encode_all(&[]), b".\r\n");
        assert_eq!(encode_all(&[b"done\r\n"]), b"done\r\n.\r\n");
        assert_eq!(encode_all(&[b"dangling\r"]), b"dangling\r\n.\r\n");
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_output(
            content in "[x.\r\n]{0,100}",
            split in 0usize..=100,
        ) {
            let bytes = content.as_bytes();
            let split = split.min(bytes.len());
            prop_assert_eq!(
                encode_all(&[&bytes[..split], &bytes[split..]]),
                encode_all(&[bytes])
            );
        }

        #[test]
        fn terminator_only_appears_at_the_end(content in "[x.\r\n]{0,100}") {
            let out = encode_all(&[content.as_bytes()]);
            prop_assert!(out.ends_with(b".\r\n"));
            if out.starts_with(b".\r\n") {
                prop_assert_eq!(out.len(), 3);
            }
            let terminators: Vec<usize> = out
                .windows(5)
                .enumerate()
                .filter(|(_, window)| *window == b"\r\n.\r\n")
                .map(|(pos, _)| pos)
                .collect();
            prop_assert!(terminators.iter().all(|&pos| pos == out.len() - 5));
        }
    }
}
