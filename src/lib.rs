//! Conduit: concurrent linear data pipelines
//!
//! Build a chain of one source, any number of transforms and one sink, and
//! run it with every stage on its own thread connected by bounded feeds.
//!
//! ```
//! use conduit::pipeline::Pipeline;
//! use conduit::pipeline::stages::{Collector, Counter, Map};
//!
//! let collector = Collector::new();
//! let mut pipeline = Pipeline::builder("squares")
//!     .source(Counter::new(0, 4))
//!     .transform(Map::new(|x: u64| Ok(Some(x * x))))
//!     .sink(collector.clone())
//!     .build()?;
//!
//! let report = pipeline.run()?;
//! assert!(report.success());
//! assert_eq!(collector.items()?, vec![0, 1, 4, 9]);
//! # Ok::<(), conduit::ConduitError>(())
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{ConduitError, ConduitResult};
pub use pipeline::{Pipeline, PipelineBuilder, RunReport, Sink, Source, Transform};
