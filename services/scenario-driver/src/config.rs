//! Command-line surface and driver configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::agent::ReapOptions;
use crate::watcher::WatchOptions;

/// Drive a live-failure scenario against an agent-managed MongoDB cluster.
///
/// Publishes the selected topology, launches the automation agent, waits
/// for the cluster to converge, holds it online, then reverses the
/// declaration and tears everything down.
#[derive(Debug, Parser)]
#[command(name = "livefail")]
#[command(author, version, about)]
pub struct Cli {
    /// Location of the config file to be used by the automation agent.
    #[arg(long, default_value = "agent-config.json")]
    pub agent_config: PathBuf,

    /// Location of the automation agent's log file.
    #[arg(long, default_value = "agent.log")]
    pub agent_log: PathBuf,

    /// Name of the topology to drive the cluster to.
    #[arg(long, default_value = "replset")]
    pub topology: String,

    /// Seconds to hold the converged cluster online before teardown.
    #[arg(long, default_value_t = 3)]
    pub sleep: u64,

    /// Create a tombstone file at the given path upon completion of the
    /// scenario.
    #[arg(long)]
    pub tombstone_file: Option<PathBuf>,

    /// Automation agent executable to launch.
    #[arg(long, default_value = "mongodb-mms-automation-agent", env = "LIVEFAIL_AGENT_BIN")]
    pub agent_bin: PathBuf,

    /// Abort a convergence wait after this many seconds instead of
    /// blocking indefinitely.
    #[arg(long)]
    pub goal_timeout: Option<u64>,

    /// Abort waiting for the agent to exit after this many seconds instead
    /// of blocking indefinitely.
    #[arg(long)]
    pub reap_timeout: Option<u64>,
}

impl Cli {
    /// Resolve the parsed arguments into an owned driver configuration.
    pub fn into_config(self) -> DriverConfig {
        DriverConfig {
            agent_bin: self.agent_bin,
            agent_config: self.agent_config,
            agent_log: self.agent_log,
            hold_online: Duration::from_secs(self.sleep),
            tombstone_file: self.tombstone_file,
            watch: WatchOptions {
                timeout: self.goal_timeout.map(Duration::from_secs),
                ..WatchOptions::default()
            },
            reap: ReapOptions {
                timeout: self.reap_timeout.map(Duration::from_secs),
                ..ReapOptions::default()
            },
        }
    }
}

/// Resolved scenario driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Automation agent executable.
    pub agent_bin: PathBuf,

    /// Where the topology document is published for the agent to poll.
    pub agent_config: PathBuf,

    /// Where the agent's combined output is collected.
    pub agent_log: PathBuf,

    /// How long the binary keeps the converged cluster online before
    /// starting teardown.
    pub hold_online: Duration,

    /// Optional completion tombstone path.
    pub tombstone_file: Option<PathBuf>,

    /// Goal state wait tuning, shared by the online and offline waits.
    pub watch: WatchOptions,

    /// Agent reap tuning.
    pub reap: ReapOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_agent_conventions() {
        let cli = Cli::parse_from(["livefail"]);
        let config = cli.into_config();

        assert_eq!(config.agent_config, PathBuf::from("agent-config.json"));
        assert_eq!(config.agent_log, PathBuf::from("agent.log"));
        assert_eq!(
            config.agent_bin,
            PathBuf::from("mongodb-mms-automation-agent")
        );
        assert_eq!(config.hold_online, Duration::from_secs(3));
        assert!(config.tombstone_file.is_none());
        assert!(config.watch.timeout.is_none());
        assert!(config.reap.timeout.is_none());
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let cli = Cli::parse_from([
            "livefail",
            "--topology",
            "replset",
            "--goal-timeout",
            "120",
            "--reap-timeout",
            "30",
            "--tombstone-file",
            "/tmp/done",
        ]);
        assert_eq!(cli.topology, "replset");

        let config = cli.into_config();
        assert_eq!(config.watch.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.reap.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.tombstone_file, Some(PathBuf::from("/tmp/done")));
    }
}
