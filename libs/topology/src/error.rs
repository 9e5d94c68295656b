//! Error types for topology documents and publishing.

use thiserror::Error;

/// Errors from topology document validation and catalog lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A replica set member references a host with no process entry.
    #[error("replica set '{replica_set}' references unknown host '{host}'")]
    UnknownHost { replica_set: String, host: String },

    /// The requested topology name has no catalog entry.
    #[error("unknown topology '{0}'")]
    UnknownTopology(String),
}

/// Errors from publishing a topology document to the agent's config file.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The document could not be serialized.
    #[error("failed to serialize topology document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The destination could not be written.
    #[error("failed to write topology config: {0}")]
    Io(#[from] std::io::Error),
}
