//! Catalog of well-known topologies.
//!
//! The catalog is an explicit object handed to the scenario driver rather
//! than ambient static data, so embedders can register their own documents
//! next to the built-in ones.

use std::collections::BTreeMap;

use serde_json::json;

use crate::document::{
    BuildArtifact, MongoDbVersion, ProcessKind, ProcessSpec, ReplicaSet, ReplicaSetMember,
    Topology,
};
use crate::error::TopologyError;

const MONGODB_VERSION: &str = "4.0.9";
const FEATURE_COMPATIBILITY_VERSION: &str = "4.0";
const DOWNLOAD_BASE: &str = "/tmp/mms-automation/test/versions";

/// Named registry of topology documents.
#[derive(Debug, Clone, Default)]
pub struct TopologyCatalog {
    topologies: BTreeMap<String, Topology>,
}

impl TopologyCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of built-in topologies. Currently `replset`: a
    /// three-member replica set on localhost ports 5000-5002.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert("replset", replica_set_topology());
        catalog
    }

    /// Register a topology under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, topology: Topology) {
        self.topologies.insert(name.into(), topology);
    }

    /// Look up a topology by name.
    pub fn get(&self, name: &str) -> Option<&Topology> {
        self.topologies.get(name)
    }

    /// Resolve `name` to an owned, validated topology document.
    pub fn resolve(&self, name: &str) -> Result<Topology, TopologyError> {
        let topology = self
            .get(name)
            .ok_or_else(|| TopologyError::UnknownTopology(name.to_string()))?;
        topology.validate()?;
        Ok(topology.clone())
    }

    /// Registered topology names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.topologies.keys().map(String::as_str)
    }
}

/// A mongod process descriptor in the shape the agent expects.
fn mongod(name: &str, port: u16, replica_set: &str) -> ProcessSpec {
    ProcessSpec {
        name: name.to_string(),
        process_type: ProcessKind::Mongod,
        version: MONGODB_VERSION.to_string(),
        feature_compatibility_version: FEATURE_COMPATIBILITY_VERSION.to_string(),
        args: json!({
            "systemLog": {
                "destination": "file",
                "path": format!("/tmp/mms-automation/logs/{name}_run.log"),
            },
            "storage": {
                "dbPath": format!("/tmp/mms-automation/data/{name}"),
            },
            "net": {
                "port": port,
            },
            "replication": {
                "replSetName": replica_set,
            },
        }),
        disabled: false,
    }
}

fn replica_set_topology() -> Topology {
    let members = ["foo1", "foo2", "foo3"];

    Topology {
        version: 1,
        processes: members
            .iter()
            .enumerate()
            .map(|(i, name)| mongod(name, 5000 + i as u16, "rs1"))
            .collect(),
        replica_sets: vec![ReplicaSet {
            id: "rs1".to_string(),
            members: members
                .iter()
                .enumerate()
                .map(|(i, name)| ReplicaSetMember {
                    id: i as u32,
                    host: name.to_string(),
                })
                .collect(),
        }],
        options: json!({
            "downloadBase": DOWNLOAD_BASE,
        }),
        mongodb_versions: vec![MongoDbVersion {
            name: MONGODB_VERSION.to_string(),
            builds: vec![BuildArtifact {
                architecture: "amd64".to_string(),
                platform: "linux".to_string(),
                url: format!(
                    "https://fastdl.mongodb.org/linux/mongodb-linux-x86_64-{MONGODB_VERSION}.tgz"
                ),
                git_version: "fc525e2d9b0e4bceff5c2201457e564362909765".to_string(),
                bits: 64,
            }],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_replset_only() {
        let catalog = TopologyCatalog::builtin();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["replset"]);
    }

    #[test]
    fn replset_shape() {
        let topology = TopologyCatalog::builtin().resolve("replset").unwrap();
        assert_eq!(topology.version, 1);
        assert_eq!(topology.process_count(), 3);
        assert_eq!(topology.replica_sets.len(), 1);
        assert_eq!(topology.replica_sets[0].members.len(), 3);
        assert_eq!(topology.processes[0].name, "foo1");
        assert_eq!(topology.processes[2].args["net"]["port"], 5002);
        assert_eq!(topology.mongodb_versions[0].name, "4.0.9");
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let err = TopologyCatalog::builtin().resolve("sharded").unwrap_err();
        assert_eq!(err, TopologyError::UnknownTopology("sharded".to_string()));
    }

    #[test]
    fn insert_registers_custom_topology() {
        let mut catalog = TopologyCatalog::builtin();
        let mut custom = catalog.resolve("replset").unwrap();
        custom.version = 7;
        catalog.insert("custom", custom);

        assert_eq!(catalog.resolve("custom").unwrap().version, 7);
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["custom", "replset"]
        );
    }
}
