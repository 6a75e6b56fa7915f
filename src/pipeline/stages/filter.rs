use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, FeedWriter, Transform};

/// Decides which items may pass a [`Filter`]
///
/// Sieves may keep state across items. Any `FnMut(&T) -> bool` closure is a sieve.
pub trait Sieve<T>: Send {
    fn sieve(&mut self, item: &T) -> bool;
}

impl<T, F> Sieve<T> for F
where
    F: FnMut(&T) -> bool + Send,
{
    fn sieve(&mut self, item: &T) -> bool {
        self(item)
    }
}

/// Transform forwarding only the items that pass its [`Sieve`]
pub struct Filter<S> {
    sieve: S,
}

impl<S> Filter<S> {
    pub fn new(sieve: S) -> Self {
        Self { sieve }
    }
}

impl<T: Send, S: Sieve<T>> Transform<T> for Filter<S> {
    fn conduct(&mut self, input: &FeedReader<T>, output: &FeedWriter<T>) -> ConduitResult<()> {
        for item in input {
            if self.sieve.sieve(&item) {
                output.emit(item)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "filter"
    }
}
