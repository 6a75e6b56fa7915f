//! Concurrent linear pipelines of sources, transforms and sinks
//!
//! A pipeline is a chain `source -> transform* -> sink`. Every stage runs on
//! its own thread (the sink on the caller's) and adjacent stages are linked
//! by bounded feeds, so a slow consumer applies backpressure all the way up
//! the chain. Items arrive at the sink in the order the source emitted them.
//!
//! A failing stage stops on its own: its output feed is closed, its input
//! feed is released, and the error is recorded in the pipeline's error log.
//! The other stages drain and finish normally.
//!
//! # Example
//! ```
//! use conduit::error::ConduitResult;
//! use conduit::pipeline::{FeedReader, FeedWriter, Pipeline, Transform};
//! use conduit::pipeline::stages::{Collector, Counter};
//!
//! // Define a custom transform
//! struct Double;
//!
//! impl Transform<u64> for Double {
//!     fn conduct(
//!         &mut self,
//!         input: &FeedReader<u64>,
//!         output: &FeedWriter<u64>,
//!     ) -> ConduitResult<()> {
//!         for item in input {
//!             output.emit(item * 2)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "double"
//!     }
//! }
//!
//! // Build and run the pipeline
//! let collector = Collector::new();
//! let mut pipeline = Pipeline::builder("doubler")
//!     .source(Counter::new(0, 5))
//!     .transform(Double)
//!     .sink(collector.clone())
//!     .build()?;
//!
//! pipeline.run()?;
//! assert_eq!(collector.items()?, vec![0, 2, 4, 6, 8]);
//! # Ok::<(), conduit::error::ConduitError>(())
//! ```

pub mod core;
pub mod error_log;
pub mod executor;
pub mod feed;
pub mod stages;

// Re-export commonly used types
pub use core::{RunReport, Sink, Source, StageResult, StageRole, Transform};
pub use error_log::{ErrorLog, StageFailure};
pub use executor::{Pipeline, PipelineBuilder};
pub use feed::{FeedReader, FeedWriter};
