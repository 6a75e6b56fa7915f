use crate::error::ConduitResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::feed::{FeedReader, FeedWriter};

/// Head of a pipeline: creates items and hands them down the chain
///
/// `produce` is called once per run. It returns when the source is
/// exhausted; returning an error stops the source, but items already
/// emitted are still delivered.
///
/// # Example
/// ```
/// use conduit::pipeline::{FeedWriter, Source};
/// use conduit::error::ConduitResult;
///
/// struct Countdown(u32);
///
/// impl Source<u32> for Countdown {
///     fn produce(&mut self, output: &FeedWriter<u32>) -> ConduitResult<()> {
///         for i in (0..self.0).rev() {
///             output.emit(i)?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Source<T>: Send {
    fn produce(&mut self, output: &FeedWriter<T>) -> ConduitResult<()>;

    /// Get stage name for logging and error reports
    fn name(&self) -> &str {
        "source"
    }
}

/// Middle of a pipeline: receives items, processes them and sends zero,
/// one or many items per input further down
pub trait Transform<T>: Send {
    /// Process items until `input` reports the end of the stream.
    ///
    /// The output feed is closed by the pipeline when this returns, whether
    /// it succeeded or not.
    fn conduct(&mut self, input: &FeedReader<T>, output: &FeedWriter<T>) -> ConduitResult<()>;

    fn name(&self) -> &str {
        "transform"
    }
}

/// End of a pipeline; runs on the thread that called `Pipeline::run`
pub trait Sink<T>: Send {
    fn consume(&mut self, input: &FeedReader<T>) -> ConduitResult<()>;

    fn name(&self) -> &str {
        "sink"
    }
}

/// Role of a stage within a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRole {
    Source,
    Transform,
    Sink,
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageRole::Source => "source",
            StageRole::Transform => "transform",
            StageRole::Sink => "sink",
        };
        f.write_str(s)
    }
}

/// Result of one stage in a pipeline run
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage name
    pub stage_name: String,

    pub role: StageRole,

    /// Position in the chain; the source is 0 and the sink is last
    pub position: usize,

    /// Whether the stage succeeded
    pub success: bool,

    /// Error message if failed
    pub error: Option<String>,

    /// Duration of execution
    pub duration: Duration,

    pub items_received: u64,

    pub items_emitted: u64,
}

impl StageResult {
    /// Create a successful stage result
    pub fn success(
        stage_name: impl Into<String>,
        role: StageRole,
        position: usize,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            role,
            position,
            success: true,
            error: None,
            duration,
            items_received: 0,
            items_emitted: 0,
        }
    }

    /// Create a failed stage result
    pub fn failure(
        stage_name: impl Into<String>,
        role: StageRole,
        position: usize,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            role,
            position,
            success: false,
            error: Some(error.into()),
            duration,
            items_received: 0,
            items_emitted: 0,
        }
    }

    pub fn with_counts(mut self, received: u64, emitted: u64) -> Self {
        self.items_received = received;
        self.items_emitted = emitted;
        self
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Pipeline name
    pub pipeline_name: String,

    /// Identifier of this run, also attached to its log span
    pub run_id: Uuid,

    /// Results from each stage, in chain order
    pub stage_results: Vec<StageResult>,

    /// Total duration
    pub total_duration: Duration,
}

impl RunReport {
    /// Whether every stage succeeded
    pub fn success(&self) -> bool {
        self.stage_results.iter().all(|r| r.success)
    }

    /// Stages that failed, in chain order
    pub fn failed_stages(&self) -> Vec<&StageResult> {
        self.stage_results.iter().filter(|r| !r.success).collect()
    }

    /// Number of items the sink received
    pub fn items_delivered(&self) -> u64 {
        self.stage_results
            .iter()
            .find(|r| r.role == StageRole::Sink)
            .map(|r| r.items_received)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(stage_results: Vec<StageResult>) -> RunReport {
        RunReport {
            pipeline_name: "test-pipeline".to_string(),
            run_id: Uuid::new_v4(),
            stage_results,
            total_duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_stage_result_success() {
        let result = StageResult::success("numbers", StageRole::Source, 0, Duration::from_secs(1))
            .with_counts(0, 42);
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.stage_name, "numbers");
        assert_eq!(result.items_emitted, 42);
    }

    #[test]
    fn test_stage_result_failure() {
        let result = StageResult::failure(
            "square",
            StageRole::Transform,
            1,
            "Something went wrong",
            Duration::from_secs(1),
        );
        assert!(!result.success);
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_run_report_success() {
        let report = report(vec![
            StageResult::success("source", StageRole::Source, 0, Duration::ZERO).with_counts(0, 3),
            StageResult::success("sink", StageRole::Sink, 1, Duration::ZERO).with_counts(3, 0),
        ]);
        assert!(report.success());
        assert!(report.failed_stages().is_empty());
        assert_eq!(report.items_delivered(), 3);
    }

    #[test]
    fn test_run_report_failure() {
        let report = report(vec![
            StageResult::success("source", StageRole::Source, 0, Duration::ZERO),
            StageResult::failure("flaky", StageRole::Transform, 1, "Failed", Duration::ZERO),
            StageResult::success("sink", StageRole::Sink, 2, Duration::ZERO),
        ]);
        assert!(!report.success());
        let failed = report.failed_stages();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].stage_name, "flaky");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(StageRole::Transform.to_string(), "transform");
    }
}
