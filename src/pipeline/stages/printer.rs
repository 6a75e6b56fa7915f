use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, Sink};
use std::fmt::Display;
use std::io::Write;

/// Sink writing every item on a line of its own using [`Display`]
pub struct Printer<W> {
    writer: W,
}

impl<W: Write + Send> Printer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Display, W: Write + Send> Sink<T> for Printer<W> {
    fn consume(&mut self, input: &FeedReader<T>) -> ConduitResult<()> {
        for item in input {
            writeln!(self.writer, "{}", item)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "printer"
    }
}

/// Sink writing byte chunks as text, one chunk per line
///
/// Chunks are decoded lossily; put a [`Utf8Normalizer`](super::Utf8Normalizer)
/// in front of it so that characters are not torn apart at chunk edges.
pub struct TextPrinter<W> {
    writer: W,
}

impl<W: Write + Send> TextPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink<Vec<u8>> for TextPrinter<W> {
    fn consume(&mut self, input: &FeedReader<Vec<u8>>) -> ConduitResult<()> {
        for chunk in input {
            writeln!(self.writer, "{}", String::from_utf8_lossy(&chunk))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "text-printer"
    }
}
