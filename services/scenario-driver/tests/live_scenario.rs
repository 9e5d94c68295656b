//! End-to-end scenario test against a scripted stand-in for the
//! automation agent.
//!
//! The fake agent behaves like the real one at the log/config interface:
//! it reports goal state once the initial topology is live, watches the
//! config file for the shutdown declaration, reports goal state again,
//! and exits on SIGINT.
//!
//! Only this binary spawns a real child and reaps with `waitpid(-1)`;
//! keeping it out of the other test binaries avoids cross-reaping.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use livefail_driver::agent::ReapOptions;
use livefail_driver::config::DriverConfig;
use livefail_driver::error::{ScenarioError, WatchError};
use livefail_driver::scenario::{Scenario, TOMBSTONE_CONTENT};
use livefail_driver::watcher::WatchOptions;
use livefail_topology::TopologyCatalog;

const FAKE_AGENT: &str = r#"#!/bin/sh
cfg="$2"
echo "All 3 Mongo processes are in goal state"
while ! grep -q '"disabled":true' "$cfg"; do
    sleep 0.1
done
echo "All 3 Mongo processes are in goal state"
trap 'exit 0' INT
while :; do
    sleep 0.2
done
"#;

/// A fake agent that exits shortly without ever reporting goal state.
const SILENT_AGENT: &str = "#!/bin/sh\nsleep 1\n";

fn install_agent(dir: &Path, script: &str) -> std::path::PathBuf {
    let bin = dir.join("fake-agent");
    fs::write(&bin, script).unwrap();
    fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
    bin
}

fn test_config(dir: &Path, agent_bin: std::path::PathBuf, goal_timeout: Duration) -> DriverConfig {
    DriverConfig {
        agent_bin,
        agent_config: dir.join("agent-config.json"),
        agent_log: dir.join("agent.log"),
        hold_online: Duration::ZERO,
        tombstone_file: Some(dir.join("tombstone")),
        watch: WatchOptions {
            poll_interval: Duration::from_millis(20),
            timeout: Some(goal_timeout),
        },
        reap: ReapOptions {
            poll_interval: Duration::from_millis(20),
            timeout: Some(Duration::from_secs(10)),
        },
    }
}

#[tokio::test]
async fn full_scenario_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let agent_bin = install_agent(dir.path(), FAKE_AGENT);
    let config = test_config(dir.path(), agent_bin, Duration::from_secs(30));

    let agent_config = config.agent_config.clone();
    let agent_log = config.agent_log.clone();
    let tombstone = dir.path().join("tombstone");

    let catalog = TopologyCatalog::builtin();
    let scenario = Scenario::from_catalog(config, &catalog, "replset").unwrap();

    let running = scenario.launch().await.unwrap();
    assert!(running.agent_pid() > 0);

    // While the scenario body runs, the published document is the initial
    // (fully enabled) topology.
    let published: serde_json::Value =
        serde_json::from_slice(&fs::read(&agent_config).unwrap()).unwrap();
    assert_eq!(published["processes"].as_array().unwrap().len(), 3);
    assert!(published["processes"][0].get("disabled").is_none());

    running.finish().await.unwrap();

    // Teardown removed the scenario artifacts and left the tombstone.
    assert!(!agent_log.exists());
    assert!(!agent_config.exists());
    assert_eq!(fs::read_to_string(&tombstone).unwrap(), TOMBSTONE_CONTENT);
}

#[tokio::test]
async fn failed_convergence_aborts_without_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let agent_bin = install_agent(dir.path(), SILENT_AGENT);
    let config = test_config(dir.path(), agent_bin, Duration::from_millis(200));

    let agent_config = config.agent_config.clone();
    let agent_log = config.agent_log.clone();
    let tombstone = dir.path().join("tombstone");

    let catalog = TopologyCatalog::builtin();
    let scenario = Scenario::from_catalog(config, &catalog, "replset").unwrap();

    let err = scenario.launch().await.unwrap_err();
    assert!(matches!(
        err,
        ScenarioError::Watch(WatchError::Timeout { .. })
    ));

    // The failed run attempts no cleanup of earlier steps.
    assert!(agent_config.exists());
    assert!(agent_log.exists());
    assert!(!tombstone.exists());
}

#[test]
fn unknown_topology_fails_before_any_side_effect() {
    let dir = tempfile::tempdir().unwrap();
    let agent_bin = install_agent(dir.path(), FAKE_AGENT);
    let config = test_config(dir.path(), agent_bin, Duration::from_secs(1));
    let agent_config = config.agent_config.clone();

    let catalog = TopologyCatalog::builtin();
    let err = Scenario::from_catalog(config, &catalog, "sharded").unwrap_err();

    assert!(matches!(err, ScenarioError::Topology(_)));
    assert!(!agent_config.exists());
}
