//! Error taxonomy for the scenario driver.
//!
//! Every error here is fatal to the run: the driver performs no retries
//! beyond the watcher's poll loop and the reaper's wait loop, and no
//! compensating cleanup of earlier steps.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use nix::errno::Errno;
use thiserror::Error;

use livefail_topology::{PublishError, TopologyError};

/// Failures launching the automation agent.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The agent log sink could not be opened for append.
    #[error("failed to open agent log {path}: {source}")]
    LogSink { path: PathBuf, source: io::Error },

    /// The agent executable could not be spawned.
    #[error("failed to spawn agent '{program}': {source}")]
    Spawn { program: PathBuf, source: io::Error },
}

/// Failures while watching the agent log for a goal state marker.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The log sink is missing or unreadable. There is no
    /// retry-on-missing-file policy; the agent is expected to have created
    /// the sink before the first watch.
    #[error("failed to read agent log {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The configured deadline passed without the marker appearing.
    #[error("goal state not reached after {elapsed:?}")]
    Timeout { elapsed: Duration },
}

/// Failures signaling or reaping the automation agent.
#[derive(Debug, Error)]
pub enum ReapError {
    /// Signal delivery to the agent pid failed.
    #[error("failed to signal agent (pid {pid}): {source}")]
    Signal { pid: i32, source: Errno },

    /// Waiting on child exits failed.
    #[error("failed to wait for agent exit: {0}")]
    Wait(Errno),

    /// The configured deadline passed without the agent's pid being reaped.
    #[error("agent (pid {pid}) did not exit within {elapsed:?}")]
    Timeout { pid: i32, elapsed: Duration },
}

/// Top-level scenario failure.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Reap(#[from] ReapError),

    /// A scenario artifact (log or config file) could not be removed.
    #[error("failed to remove scenario artifact {path}: {source}")]
    Cleanup { path: PathBuf, source: io::Error },

    /// The completion tombstone could not be created.
    #[error("failed to create tombstone {path}: {source}")]
    Tombstone { path: PathBuf, source: io::Error },
}
