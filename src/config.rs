//! Configuration for conduit pipelines.

use crate::error::{ConduitError, ConduitResult};
use crate::logger::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for the feed capacity; feeds preallocate their slots.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name used in logs and run reports
    #[serde(default = "default_name")]
    pub name: String,

    /// Capacity of every feed between adjacent stages
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Chunk size for byte readers
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    /// Minimum level for the demo subscriber
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_name() -> String {
    "conduit".to_string()
}

fn default_capacity() -> usize {
    10
}

fn default_read_chunk_size() -> usize {
    8192
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            capacity: default_capacity(),
            read_chunk_size: default_read_chunk_size(),
            log_level: LogLevel::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConduitResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConduitError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> ConduitResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConduitResult<()> {
        if self.capacity == 0 {
            return Err(ConduitError::Configuration(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConduitError::Configuration(format!(
                "capacity {} exceeds the maximum of {}",
                self.capacity, MAX_CAPACITY
            )));
        }
        if self.read_chunk_size == 0 {
            return Err(ConduitError::Configuration(
                "read_chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
