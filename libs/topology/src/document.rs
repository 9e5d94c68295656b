//! The topology document model.
//!
//! Field names follow the wire format the automation agent expects
//! (`processType`, `featureCompatibilityVersion`, `args2_6`, `replicaSets`,
//! `mongoDbVersions`), so a serialized document is exactly what the agent
//! polls for.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TopologyError;

/// Kind of cluster process the agent should supervise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    /// A data-bearing `mongod` node.
    Mongod,
    /// A `mongos` query router.
    Mongos,
}

/// One process the agent is asked to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Process name; replica set members reference this as their `host`.
    pub name: String,

    #[serde(rename = "processType")]
    pub process_type: ProcessKind,

    /// Server version the agent should download and run.
    pub version: String,

    #[serde(rename = "featureCompatibilityVersion")]
    pub feature_compatibility_version: String,

    /// Free-form process arguments: systemLog destination/path, storage
    /// dbPath, net port, replication replSetName.
    #[serde(rename = "args2_6")]
    pub args: Value,

    /// Set on every process at once to declare cluster shutdown. Absent
    /// from the serialized document until then.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A replica set grouping of processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSet {
    #[serde(rename = "_id")]
    pub id: String,

    /// Ordered member list; each `host` names a [`ProcessSpec`].
    pub members: Vec<ReplicaSetMember>,
}

/// One member of a replica set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSetMember {
    #[serde(rename = "_id")]
    pub id: u32,

    /// Name of the process entry backing this member.
    pub host: String,
}

/// A downloadable server version the agent may install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoDbVersion {
    pub name: String,
    pub builds: Vec<BuildArtifact>,
}

/// A single build artifact for a server version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub architecture: String,
    pub platform: String,
    pub url: String,

    #[serde(rename = "gitVersion")]
    pub git_version: String,

    pub bits: u32,
}

/// The desired state of the whole cluster, as the agent reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Document version; the agent applies the newest it has seen.
    pub version: u64,

    /// Ordered process descriptors. The length of this list is the goal
    /// state process count the agent reports against.
    pub processes: Vec<ProcessSpec>,

    #[serde(rename = "replicaSets")]
    pub replica_sets: Vec<ReplicaSet>,

    /// Free-form agent settings (download base directory, etc).
    pub options: Value,

    /// Catalog of build artifacts keyed by version string.
    #[serde(rename = "mongoDbVersions")]
    pub mongodb_versions: Vec<MongoDbVersion>,
}

impl Topology {
    /// Number of declared processes; drives the goal state marker text.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Declare cluster shutdown by disabling every process descriptor.
    ///
    /// The whole set is updated before the caller republishes; there is no
    /// per-process disable surface.
    pub fn disable_all(&mut self) {
        for process in &mut self.processes {
            process.disabled = true;
        }
    }

    /// Check that every replica set member's `host` names a process entry.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for replica_set in &self.replica_sets {
            for member in &replica_set.members {
                if !self.processes.iter().any(|p| p.name == member.host) {
                    return Err(TopologyError::UnknownHost {
                        replica_set: replica_set.id.clone(),
                        host: member.host.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
