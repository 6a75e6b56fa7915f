use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, FeedWriter, Transform};

/// Transform applying a function to every item
///
/// Returning `Ok(None)` drops the item, so a `Map` can double as a filter.
/// Returning an error stops the stage; items still buffered upstream are
/// not processed.
pub struct Map<F> {
    f: F,
    name: String,
}

impl<F> Map<F> {
    pub fn new<T>(f: F) -> Self
    where
        F: FnMut(T) -> ConduitResult<Option<T>>,
    {
        Self {
            f,
            name: "map".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T, F> Transform<T> for Map<F>
where
    T: Send,
    F: FnMut(T) -> ConduitResult<Option<T>> + Send,
{
    fn conduct(&mut self, input: &FeedReader<T>, output: &FeedWriter<T>) -> ConduitResult<()> {
        for item in input {
            if let Some(mapped) = (self.f)(item)? {
                output.emit(mapped)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
