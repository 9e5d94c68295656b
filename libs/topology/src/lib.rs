//! # livefail-topology
//!
//! Declarative cluster topology documents for the MMS automation agent.
//!
//! A topology document describes the desired state of a MongoDB cluster:
//! which processes should run, how they group into replica sets, and which
//! build artifacts the agent may download. The automation agent polls a
//! config file for the current document and converges the cluster to match;
//! this crate owns the document model, the catalog of well-known topologies,
//! and the publish step that lands a document where the agent reads it.
//!
//! ## Invariants
//!
//! - Every `host` referenced by a replica set names a process entry
//!   ([`Topology::validate`]).
//! - Shutdown is declared by disabling every process at once
//!   ([`Topology::disable_all`]); the document is never partially mutated
//!   between publishes.
//! - Publishing is a full overwrite of the destination, and publishing the
//!   same document twice produces byte-identical output.

mod catalog;
mod document;
mod error;
mod publish;

pub use catalog::TopologyCatalog;
pub use document::{
    BuildArtifact, MongoDbVersion, ProcessKind, ProcessSpec, ReplicaSet, ReplicaSetMember,
    Topology,
};
pub use error::{PublishError, TopologyError};
pub use publish::publish;
