use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, Sink};
use std::sync::{Arc, Mutex};

/// Sink collecting every item it receives
///
/// Clones share the same storage, so a clone kept by the caller can read the
/// items once the pipeline that owns the other clone has run. The storage is
/// cleared at the start of every run.
#[derive(Debug)]
pub struct Collector<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Collector<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> Collector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> ConduitResult<usize> {
        Ok(self.items.lock()?.len())
    }

    pub fn is_empty(&self) -> ConduitResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Take the collected items, leaving the collector empty
    pub fn take(&self) -> ConduitResult<Vec<T>> {
        Ok(std::mem::take(&mut *self.items.lock()?))
    }
}

impl<T: Clone> Collector<T> {
    /// Copy of the collected items
    pub fn items(&self) -> ConduitResult<Vec<T>> {
        Ok(self.items.lock()?.clone())
    }
}

impl<T: Send> Sink<T> for Collector<T> {
    fn consume(&mut self, input: &FeedReader<T>) -> ConduitResult<()> {
        self.items.lock()?.clear();
        for item in input {
            self.items.lock()?.push(item);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "collector"
    }
}
