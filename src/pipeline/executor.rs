use super::core::{RunReport, Sink, Source, StageResult, StageRole, Transform};
use super::error_log::{ErrorLog, StageFailure};
use super::feed;
use crate::config::{PipelineConfig, MAX_CAPACITY};
use crate::error::{ConduitError, ConduitResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Pipeline executor that runs all stages concurrently
///
/// The source and every transform run on their own thread; the sink runs on
/// the thread calling [`Pipeline::run`]. Adjacent stages are connected by
/// bounded feeds of the same capacity.
///
/// # Example
/// ```
/// use conduit::pipeline::Pipeline;
/// use conduit::pipeline::stages::{Collector, Counter, Map};
///
/// let collector = Collector::new();
/// let mut pipeline = Pipeline::builder("squares")
///     .source(Counter::new(0, 10))
///     .transform(Map::new(|x: u64| Ok(Some(x * x))))
///     .sink(collector.clone())
///     .capacity(4)
///     .build()
///     .unwrap();
///
/// pipeline.run().unwrap();
/// assert_eq!(collector.items().unwrap()[3], 9);
/// ```
pub struct Pipeline<T> {
    name: String,
    source: Box<dyn Source<T>>,
    transforms: Vec<Box<dyn Transform<T>>>,
    sink: Box<dyn Sink<T>>,
    capacity: usize,
    errors: Vec<StageFailure>,
    last_report: Option<RunReport>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Create a new pipeline builder
    pub fn builder(name: impl Into<String>) -> PipelineBuilder<T> {
        PipelineBuilder::new(name)
    }

    /// Create a pipeline from its stages and the capacity of its feeds
    pub fn new(
        source: Box<dyn Source<T>>,
        transforms: Vec<Box<dyn Transform<T>>>,
        sink: Box<dyn Sink<T>>,
        capacity: usize,
    ) -> ConduitResult<Self> {
        PipelineBuilder::new(PipelineConfig::default().name)
            .boxed_source(source)
            .boxed_transforms(transforms)
            .boxed_sink(sink)
            .capacity(capacity)
            .build()
    }

    /// Get the pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stages, source and sink included
    pub fn stage_count(&self) -> usize {
        self.transforms.len() + 2
    }

    /// Errors recorded by the stages of the last run
    pub fn errors(&self) -> &[StageFailure] {
        &self.errors
    }

    /// Report of the last run that got as far as starting its stages
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Run the pipeline once.
    ///
    /// Returns after every stage has terminated. Stage errors do not stop
    /// the other stages; they are collected in [`Pipeline::errors`] and
    /// reported as [`ConduitError::ErrorsOccurred`]. A feed or thread that
    /// cannot be allocated fails the run with [`ConduitError::Resource`].
    pub fn run(&mut self) -> ConduitResult<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", pipeline = %self.name, %run_id);
        let _enter = span.enter();

        self.errors.clear();
        self.last_report = None;

        tracing::info!(
            "Starting pipeline '{}' with {} stages (capacity {})",
            self.name,
            self.stage_count(),
            self.capacity
        );
        let run_start = Instant::now();

        // Allocate every feed before any stage starts
        let (source_output, mut upstream) = feed::bounded::<T>(self.capacity)?;
        let mut links = Vec::with_capacity(self.transforms.len());
        for _ in 0..self.transforms.len() {
            let (writer, reader) = feed::bounded::<T>(self.capacity)?;
            links.push((upstream, writer));
            upstream = reader;
        }
        let sink_input = upstream;

        let log = ErrorLog::new();
        let sink_position = self.transforms.len() + 1;
        let source = &mut self.source;
        let transforms = &mut self.transforms;
        let sink = &mut self.sink;

        let outcome = thread::scope(|scope| -> ConduitResult<Vec<StageResult>> {
            let log = &log;

            let mut transform_handles = Vec::with_capacity(transforms.len());
            for (index, (transform, (input, output))) in
                transforms.iter_mut().zip(links).enumerate()
            {
                let stage = StageInfo::new(transform.name(), StageRole::Transform, index + 1);
                let handle = thread::Builder::new()
                    .name(format!("conduit-transform-{}", stage.position))
                    .spawn_scoped(scope, {
                        let stage = stage.clone();
                        move || {
                            let start = Instant::now();
                            let outcome = guard(|| transform.conduct(&input, &output));
                            let (received, emitted) = (input.received(), output.emitted());
                            // Downstream terminates no matter how this stage ended
                            drop(output);
                            drop(input);
                            settle(log, &stage, outcome, start.elapsed())
                                .with_counts(received, emitted)
                        }
                    })
                    .map_err(|e| stage.spawn_error(e))?;
                transform_handles.push((stage, handle));
            }

            let source_stage = StageInfo::new(source.name(), StageRole::Source, 0);
            let source_handle = thread::Builder::new()
                .name("conduit-source".to_string())
                .spawn_scoped(scope, {
                    let stage = source_stage.clone();
                    move || {
                        let start = Instant::now();
                        let outcome = guard(|| source.produce(&source_output));
                        let emitted = source_output.emitted();
                        drop(source_output);
                        settle(log, &stage, outcome, start.elapsed()).with_counts(0, emitted)
                    }
                })
                .map_err(|e| source_stage.spawn_error(e))?;

            let sink_stage = StageInfo::new(sink.name(), StageRole::Sink, sink_position);
            let start = Instant::now();
            let outcome = guard(|| sink.consume(&sink_input));
            let received = sink_input.received();
            // Upstream writers must not block on a sink that stopped reading
            drop(sink_input);
            let sink_result =
                settle(log, &sink_stage, outcome, start.elapsed()).with_counts(received, 0);

            let mut results = Vec::with_capacity(transform_handles.len() + 2);
            results.push(join_stage(log, &source_stage, source_handle));
            for (stage, handle) in transform_handles {
                results.push(join_stage(log, &stage, handle));
            }
            results.push(sink_result);
            Ok(results)
        });

        self.errors = log.into_failures()?;
        let stage_results = outcome?;

        let report = RunReport {
            pipeline_name: self.name.clone(),
            run_id,
            stage_results,
            total_duration: run_start.elapsed(),
        };
        self.last_report = Some(report.clone());

        if !self.errors.is_empty() {
            tracing::error!(
                "Pipeline '{}' finished with {} failed stage(s) in {:.2}s",
                self.name,
                self.errors.len(),
                report.total_duration.as_secs_f64()
            );
            return Err(ConduitError::ErrorsOccurred(self.errors.len()));
        }

        tracing::info!(
            "Pipeline '{}' completed successfully in {:.2}s ({} items delivered)",
            self.name,
            report.total_duration.as_secs_f64(),
            report.items_delivered()
        );
        Ok(report)
    }
}

/// Identity of a stage within one run
#[derive(Debug, Clone)]
struct StageInfo {
    name: String,
    role: StageRole,
    position: usize,
}

impl StageInfo {
    fn new(name: &str, role: StageRole, position: usize) -> Self {
        Self {
            name: name.to_string(),
            role,
            position,
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> ConduitError {
        ConduitError::Resource(format!(
            "failed to spawn thread for {} '{}': {}",
            self.role, self.name, err
        ))
    }
}

/// Run a stage body, turning a panic into a stage error
fn guard<F>(body: F) -> ConduitResult<()>
where
    F: FnOnce() -> ConduitResult<()>,
{
    panic::catch_unwind(AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(ConduitError::StagePanicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Log the outcome of a stage and record its error, if any
fn settle(
    log: &ErrorLog,
    stage: &StageInfo,
    outcome: ConduitResult<()>,
    duration: Duration,
) -> StageResult {
    match outcome {
        Ok(()) => {
            tracing::debug!(
                "{} '{}' completed in {:.3}s",
                stage.role,
                stage.name,
                duration.as_secs_f64()
            );
            StageResult::success(&stage.name, stage.role, stage.position, duration)
        }
        // The stage that stopped reading has its own entry
        Err(error) if error.is_feed_closed() => {
            tracing::debug!(
                "{} '{}' stopped: downstream feed closed",
                stage.role,
                stage.name
            );
            StageResult::success(&stage.name, stage.role, stage.position, duration)
        }
        Err(error) => {
            tracing::warn!("{} '{}' failed: {}", stage.role, stage.name, error);
            let message = error.to_string();
            if let Err(e) = log.record(StageFailure::new(
                &stage.name,
                stage.role,
                stage.position,
                error,
            )) {
                tracing::error!("Failed to record failure of '{}': {}", stage.name, e);
            }
            StageResult::failure(&stage.name, stage.role, stage.position, message, duration)
        }
    }
}

fn join_stage(
    log: &ErrorLog,
    stage: &StageInfo,
    handle: ScopedJoinHandle<'_, StageResult>,
) -> StageResult {
    match handle.join() {
        Ok(result) => result,
        Err(payload) => settle(
            log,
            stage,
            Err(ConduitError::StagePanicked(panic_message(payload))),
            Duration::ZERO,
        ),
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder<T> {
    name: String,
    source: Option<Box<dyn Source<T>>>,
    transforms: Vec<Box<dyn Transform<T>>>,
    sink: Option<Box<dyn Sink<T>>>,
    capacity: usize,
}

impl<T: Send + 'static> PipelineBuilder<T> {
    /// Create a new pipeline builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            transforms: Vec::new(),
            sink: None,
            capacity: PipelineConfig::default().capacity,
        }
    }

    /// Take name and capacity from a configuration
    pub fn config(mut self, config: &PipelineConfig) -> Self {
        self.name = config.name.clone();
        self.capacity = config.capacity;
        self
    }

    pub fn source<S: Source<T> + 'static>(self, source: S) -> Self {
        self.boxed_source(Box::new(source))
    }

    pub fn boxed_source(mut self, source: Box<dyn Source<T>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Append a transform; transforms run in the order they are added
    pub fn transform<C: Transform<T> + 'static>(self, transform: C) -> Self {
        self.boxed_transform(Box::new(transform))
    }

    pub fn boxed_transform(mut self, transform: Box<dyn Transform<T>>) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn boxed_transforms(
        mut self,
        transforms: impl IntoIterator<Item = Box<dyn Transform<T>>>,
    ) -> Self {
        self.transforms.extend(transforms);
        self
    }

    pub fn sink<K: Sink<T> + 'static>(self, sink: K) -> Self {
        self.boxed_sink(Box::new(sink))
    }

    pub fn boxed_sink(mut self, sink: Box<dyn Sink<T>>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> ConduitResult<Pipeline<T>> {
        let source = self.source.ok_or_else(|| {
            ConduitError::Configuration(format!("pipeline '{}' has no source", self.name))
        })?;
        let sink = self.sink.ok_or_else(|| {
            ConduitError::Configuration(format!("pipeline '{}' has no sink", self.name))
        })?;
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConduitError::Configuration(format!(
                "capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, self.capacity
            )));
        }

        Ok(Pipeline {
            name: self.name,
            source,
            transforms: self.transforms,
            sink,
            capacity: self.capacity,
            errors: Vec::new(),
            last_report: None,
        })
    }
}
