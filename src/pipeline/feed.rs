//! Bounded FIFO feeds connecting adjacent stages.
//!
//! A feed has exactly one writer and one reader. Dropping the [`FeedWriter`]
//! closes the feed for writing: the reader drains what is buffered and then
//! observes the end of the stream. Dropping the [`FeedReader`] makes every
//! further [`FeedWriter::emit`] fail with [`ConduitError::FeedClosed`].

use crate::error::{ConduitError, ConduitResult};
use crossbeam_channel::{bounded as channel, Receiver, Sender};
use std::cell::Cell;

/// Allocate a feed holding at most `capacity` items.
pub fn bounded<T>(capacity: usize) -> ConduitResult<(FeedWriter<T>, FeedReader<T>)> {
    // crossbeam treats 0 as a rendezvous channel, which is not a buffer
    if capacity == 0 {
        return Err(ConduitError::Resource(
            "cannot allocate a feed with capacity 0".to_string(),
        ));
    }

    let (tx, rx) = channel(capacity);
    Ok((
        FeedWriter {
            tx,
            emitted: Cell::new(0),
        },
        FeedReader {
            rx,
            received: Cell::new(0),
        },
    ))
}

/// Writing end of a feed
pub struct FeedWriter<T> {
    tx: Sender<T>,
    emitted: Cell<u64>,
}

impl<T> FeedWriter<T> {
    /// Hand an item to the downstream stage, blocking while the feed is full.
    pub fn emit(&self, item: T) -> ConduitResult<()> {
        self.tx.send(item).map_err(|_| ConduitError::FeedClosed)?;
        self.emitted.set(self.emitted.get() + 1);
        Ok(())
    }

    /// Number of items emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted.get()
    }
}

/// Reading end of a feed
pub struct FeedReader<T> {
    rx: Receiver<T>,
    received: Cell<u64>,
}

impl<T> FeedReader<T> {
    /// Take the next item, blocking while the feed is empty but still open.
    ///
    /// Returns `None` once the writer is gone and every buffered item has
    /// been received.
    pub fn receive(&self) -> Option<T> {
        let item = self.rx.recv().ok()?;
        self.received.set(self.received.get() + 1);
        Some(item)
    }

    /// Number of items received so far
    pub fn received(&self) -> u64 {
        self.received.get()
    }

    pub fn iter(&self) -> FeedIter<'_, T> {
        FeedIter { reader: self }
    }
}

/// Blocking iterator over the items of a feed
pub struct FeedIter<'a, T> {
    reader: &'a FeedReader<T>,
}

impl<T> Iterator for FeedIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.reader.receive()
    }
}

impl<'a, T> IntoIterator for &'a FeedReader<T> {
    type Item = T;
    type IntoIter = FeedIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_zero_capacity_is_resource_error() {
        let result = bounded::<u32>(0);
        assert!(matches!(result, Err(ConduitError::Resource(_))));
    }

    #[test]
    fn test_fifo_and_drain_after_close() {
        let (writer, reader) = bounded(4).unwrap();
        for i in 0..4 {
            writer.emit(i).unwrap();
        }
        assert_eq!(writer.emitted(), 4);
        drop(writer);

        let items: Vec<i32> = reader.iter().collect();
        assert_eq!(items, vec![0, 1, 2, 3]);
        assert_eq!(reader.received(), 4);
        assert_eq!(reader.receive(), None);
    }

    #[test]
    fn test_emit_fails_after_reader_dropped() {
        let (writer, reader) = bounded(2).unwrap();
        drop(reader);
        let result = writer.emit(1);
        assert!(matches!(result, Err(ConduitError::FeedClosed)));
        assert_eq!(writer.emitted(), 0);
    }

    #[test]
    fn test_writer_blocks_until_reader_catches_up() {
        let (writer, reader) = bounded(1).unwrap();
        let producer = thread::spawn(move || {
            for i in 0..100u32 {
                writer.emit(i).unwrap();
            }
        });

        let mut received = Vec::new();
        for item in &reader {
            received.push(item);
        }
        producer.join().unwrap();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }
}
