use thiserror::Error;

/// Central error type for conduit pipelines
#[derive(Error, Debug)]
pub enum ConduitError {
    // ============================================================================
    // Construction Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resource error: {0}")]
    Resource(String),

    // ============================================================================
    // Run Errors
    // ============================================================================
    /// Returned by `Pipeline::run` when the error log is not empty
    #[error("Errors occurred in {0} stage(s)")]
    ErrorsOccurred(usize),

    #[error("Stage error: {0}")]
    Stage(String),

    #[error("Stage panicked: {0}")]
    StagePanicked(String),

    /// The downstream stage stopped reading and dropped its end of the feed
    #[error("Downstream feed closed")]
    FeedClosed,

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Mutex lock error")]
    LockError,

    #[error("{0}")]
    GenericError(String),
}

impl ConduitError {
    /// True if this error only reports that the downstream feed went away
    pub fn is_feed_closed(&self) -> bool {
        matches!(self, ConduitError::FeedClosed)
    }
}

// Implement conversion from PoisonError for Mutex locks
impl<T> From<std::sync::PoisonError<T>> for ConduitError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ConduitError::LockError
    }
}

// Application stages report plain messages
impl From<String> for ConduitError {
    fn from(err: String) -> Self {
        ConduitError::GenericError(err)
    }
}

impl From<&str> for ConduitError {
    fn from(err: &str) -> Self {
        ConduitError::GenericError(err.to_string())
    }
}

// Helper type alias for Results
pub type ConduitResult<T> = Result<T, ConduitError>;
