//! Re-chunking of UTF-8 byte streams at character boundaries.

use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, FeedWriter, Transform};

/// Maximum length of a UTF-8 encoded character
const UTF8_MAX: usize = 4;

/// At most this many bytes of an unfinished character are held back
const MAX_PENDING: usize = UTF8_MAX - 1;

/// Emitted in place of a byte sequence that can never form a character (U+FFFD)
pub const REPLACEMENT: &[u8] = b"\xEF\xBF\xBD";

/// What a run of bytes amounts to when read as a single character
#[derive(Debug, PartialEq, Eq)]
enum Sequence {
    Complete,
    /// A valid prefix that more bytes could complete
    Incomplete,
    Invalid,
}

fn classify(bytes: &[u8]) -> Sequence {
    match std::str::from_utf8(bytes) {
        Ok(_) => Sequence::Complete,
        Err(e) if e.valid_up_to() == 0 && e.error_len().is_none() => Sequence::Incomplete,
        Err(_) => Sequence::Invalid,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Start of an unfinished character at the end of `bytes`, or `bytes.len()`
/// if the chunk ends on a boundary.
///
/// Only the last `MAX_PENDING` bytes are inspected; a tail without a
/// leading byte in that window is passed on as it is.
fn split_point(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(MAX_PENDING) {
        let start = len - back;
        if is_continuation(bytes[start]) {
            continue;
        }
        return match classify(&bytes[start..]) {
            Sequence::Incomplete => start,
            Sequence::Complete | Sequence::Invalid => len,
        };
    }
    len
}

/// Transform that re-chunks a byte stream so that no emitted chunk ends in
/// the middle of a UTF-8 character
///
/// The bytes of a character split across two input chunks are held back and
/// emitted as a chunk of their own once the character is complete. The
/// concatenation of the output equals the concatenation of the input for
/// valid UTF-8. Held bytes that turn out not to start a character are
/// replaced by [`REPLACEMENT`], as are held bytes left over at the end of the
/// stream.
///
/// # Example
/// ```
/// use conduit::pipeline::stages::Utf8Normalizer;
///
/// let mut normalizer = Utf8Normalizer::new();
/// let euro = "€".as_bytes();
///
/// let first = normalizer.normalize(&[b'a', euro[0]]);
/// assert_eq!(first, vec![b"a".to_vec()]);
///
/// let second = normalizer.normalize(&[euro[1], euro[2], b'b']);
/// assert_eq!(second, vec![euro.to_vec(), b"b".to_vec()]);
/// ```
#[derive(Debug, Default)]
pub struct Utf8Normalizer {
    pending: [u8; MAX_PENDING],
    len: usize,
}

impl Utf8Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of an unfinished character currently held back
    pub fn pending(&self) -> &[u8] {
        &self.pending[..self.len]
    }

    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Feed one input chunk; returns the chunks to emit, in order.
    ///
    /// An empty chunk produces nothing.
    pub fn normalize(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(2);

        let consumed = self.complete_pending(chunk, &mut out);
        let rest = &chunk[consumed..];
        if rest.is_empty() {
            return out;
        }

        let split = split_point(rest);
        if split < rest.len() {
            let tail = &rest[split..];
            self.pending[..tail.len()].copy_from_slice(tail);
            self.len = tail.len();
        }
        if split > 0 {
            out.push(rest[..split].to_vec());
        }
        out
    }

    /// Flush at the end of the stream.
    ///
    /// Returns a replacement marker if an unfinished character is still held.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.len == 0 {
            return None;
        }
        tracing::debug!(
            "Replacing {} unterminated byte(s) at end of stream",
            self.len
        );
        self.len = 0;
        Some(REPLACEMENT.to_vec())
    }

    /// Extend the held bytes with the head of `chunk` until they resolve.
    ///
    /// Returns how many bytes of `chunk` were consumed.
    fn complete_pending(&mut self, chunk: &[u8], out: &mut Vec<Vec<u8>>) -> usize {
        if self.len == 0 {
            return 0;
        }

        let mut candidate = [0u8; UTF8_MAX];
        let mut len = self.len;
        candidate[..len].copy_from_slice(&self.pending[..len]);

        let mut consumed = 0;
        while consumed < chunk.len() {
            candidate[len] = chunk[consumed];
            match classify(&candidate[..=len]) {
                Sequence::Complete => {
                    out.push(candidate[..=len].to_vec());
                    self.len = 0;
                    return consumed + 1;
                }
                Sequence::Incomplete => {
                    len += 1;
                    consumed += 1;
                    if len > MAX_PENDING {
                        break;
                    }
                }
                // The byte that broke the sequence is processed as part of the chunk
                Sequence::Invalid => {
                    out.push(REPLACEMENT.to_vec());
                    self.len = 0;
                    return consumed;
                }
            }
        }

        if len > MAX_PENDING {
            out.push(REPLACEMENT.to_vec());
            self.len = 0;
        } else {
            self.pending[..len].copy_from_slice(&candidate[..len]);
            self.len = len;
        }
        consumed
    }
}

impl Transform<Vec<u8>> for Utf8Normalizer {
    fn conduct(
        &mut self,
        input: &FeedReader<Vec<u8>>,
        output: &FeedWriter<Vec<u8>>,
    ) -> ConduitResult<()> {
        self.reset();
        for chunk in input {
            for piece in self.normalize(&chunk) {
                output.emit(piece)?;
            }
        }
        if let Some(marker) = self.finish() {
            output.emit(marker)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "utf8-normalizer"
    }
}
