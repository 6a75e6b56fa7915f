use crate::error::ConduitResult;
use crate::pipeline::{FeedWriter, Source};

/// Creates items on demand for a [`Generic`] source
pub trait Generator<T>: Send {
    /// Next item, or `None` once exhausted
    fn generate(&mut self) -> ConduitResult<Option<T>>;
}

/// Source that keeps calling a [`Generator`] and sends every item down the
/// chain until the generator is exhausted or fails
pub struct Generic<G> {
    generator: G,
    name: String,
}

impl<G> Generic<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            name: "generic".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T, G: Generator<T>> Source<T> for Generic<G> {
    fn produce(&mut self, output: &FeedWriter<T>) -> ConduitResult<()> {
        while let Some(item) = self.generator.generate()? {
            output.emit(item)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Source emitting `start..end`, restarting on every run
#[derive(Debug, Clone)]
pub struct Counter {
    start: u64,
    end: u64,
}

impl Counter {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

impl Source<u64> for Counter {
    fn produce(&mut self, output: &FeedWriter<u64>) -> ConduitResult<()> {
        for i in self.start..self.end {
            output.emit(i)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "counter"
    }
}
