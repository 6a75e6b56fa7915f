use super::core::StageRole;
use crate::error::{ConduitError, ConduitResult};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Mutex;

/// A stage error captured during a run
#[derive(Debug, Serialize)]
pub struct StageFailure {
    pub timestamp: DateTime<Utc>,
    pub stage: String,
    pub role: StageRole,
    pub position: usize,
    #[serde(serialize_with = "serialize_error")]
    pub error: ConduitError,
}

fn serialize_error<S: Serializer>(error: &ConduitError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl StageFailure {
    pub fn new(
        stage: impl Into<String>,
        role: StageRole,
        position: usize,
        error: ConduitError,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            stage: stage.into(),
            role,
            position,
            error,
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' failed: {}", self.role, self.stage, self.error)
    }
}

/// Append-only error collection shared by the stages of one run
#[derive(Debug, Default)]
pub struct ErrorLog {
    failures: Mutex<Vec<StageFailure>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, failure: StageFailure) -> ConduitResult<()> {
        self.failures.lock()?.push(failure);
        Ok(())
    }

    /// Consume the log once every writer is done
    pub fn into_failures(self) -> ConduitResult<Vec<StageFailure>> {
        Ok(self.failures.into_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_and_consume() {
        let log = ErrorLog::new();

        log.record(StageFailure::new(
            "square",
            StageRole::Transform,
            1,
            "random error".into(),
        ))
        .unwrap();

        let failures = log.into_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, "square");
        assert_eq!(failures[0].error.to_string(), "random error");
        assert_eq!(
            failures[0].to_string(),
            "transform 'square' failed: random error"
        );
    }

    #[test]
    fn test_concurrent_writers() {
        let log = ErrorLog::new();
        thread::scope(|s| {
            for position in 0..8 {
                let log = &log;
                s.spawn(move || {
                    log.record(StageFailure::new(
                        format!("stage-{position}"),
                        StageRole::Transform,
                        position,
                        ConduitError::Stage("boom".to_string()),
                    ))
                    .unwrap();
                });
            }
        });
        assert_eq!(log.into_failures().unwrap().len(), 8);
    }

    #[test]
    fn test_failure_serializes_error_message() {
        let failure = StageFailure::new(
            "reader",
            StageRole::Source,
            0,
            ConduitError::Stage("disk gone".to_string()),
        );
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"], "reader");
        assert_eq!(json["role"], "source");
        assert_eq!(json["error"], "Stage error: disk gone");
    }
}
