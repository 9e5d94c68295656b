//! Publishing a topology document to the agent's config file.

use std::fs;
use std::path::Path;

use crate::document::Topology;
use crate::error::PublishError;

/// Serialize `topology` and fully overwrite `destination` with it.
///
/// The agent polls `destination` on its own schedule; the caller is the
/// single writer and must not read the file concurrently with a publish.
/// Serialization is deterministic, so republishing an unchanged document
/// rewrites identical bytes.
pub fn publish(topology: &Topology, destination: &Path) -> Result<(), PublishError> {
    let payload = serde_json::to_vec(topology)?;
    fs::write(destination, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TopologyCatalog;

    #[test]
    fn publish_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent-config.json");
        fs::write(&dest, "stale content that is much longer than the document needs").unwrap();

        let topology = TopologyCatalog::builtin().resolve("replset").unwrap();
        publish(&topology, &dest).unwrap();

        let written: Topology = serde_json::from_slice(&fs::read(&dest).unwrap()).unwrap();
        assert_eq!(written, topology);
    }

    #[test]
    fn republish_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent-config.json");
        let topology = TopologyCatalog::builtin().resolve("replset").unwrap();

        publish(&topology, &dest).unwrap();
        let first = fs::read(&dest).unwrap();
        publish(&topology, &dest).unwrap();
        let second = fs::read(&dest).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn publish_to_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("agent-config.json");

        let topology = TopologyCatalog::builtin().resolve("replset").unwrap();
        let err = publish(&topology, &dest).unwrap_err();
        assert!(matches!(err, PublishError::Io(_)));
    }
}
