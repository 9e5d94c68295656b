//! Automation agent supervision.
//!
//! Launches the external automation agent as a child process with its
//! combined output appended to the log sink, and later drives signal-based
//! termination with reliable reaping. The agent's own convergence is only
//! observable through the log sink (see [`crate::watcher`]).

use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{LaunchError, ReapError};

/// Flag the agent takes its cluster config path under.
const CLUSTER_CONFIG_FLAG: &str = "-cluster";

/// Tuning for the reap wait.
#[derive(Debug, Clone)]
pub struct ReapOptions {
    /// Sleep between empty exit polls.
    pub poll_interval: Duration,

    /// Give up after this long. `None` waits until the agent exits.
    pub timeout: Option<Duration>,
}

impl Default for ReapOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

/// Handle to a launched automation agent process.
///
/// Owned by the orchestrator for the lifetime of the scenario; consumed by
/// [`AgentSupervisor::reap`], after which the pid is no longer valid.
#[derive(Debug)]
pub struct AgentSupervisor {
    pid: Pid,
}

impl AgentSupervisor {
    /// Spawn `program -cluster <config_path>` with stdout and stderr
    /// appended to `log_sink`.
    ///
    /// Returns as soon as the process is spawned; the agent's startup and
    /// convergence happen on its own schedule.
    pub fn launch(
        program: &Path,
        config_path: &Path,
        log_sink: &Path,
    ) -> Result<Self, LaunchError> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_sink)
            .map_err(|source| LaunchError::LogSink {
                path: log_sink.to_path_buf(),
                source,
            })?;
        let log_for_stderr = log.try_clone().map_err(|source| LaunchError::LogSink {
            path: log_sink.to_path_buf(),
            source,
        })?;

        let child = Command::new(program)
            .arg(CLUSTER_CONFIG_FLAG)
            .arg(config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_for_stderr))
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let pid = Pid::from_raw(child.id() as i32);
        info!(pid = pid.as_raw(), program = %program.display(), "automation agent launched");

        Ok(Self { pid })
    }

    /// The agent's process id.
    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }

    /// Deliver SIGINT to the agent, asking it to shut down.
    pub fn interrupt(&self) -> Result<(), ReapError> {
        kill(self.pid, Signal::SIGINT).map_err(|source| ReapError::Signal {
            pid: self.pid.as_raw(),
            source,
        })
    }

    /// Wait until the agent's pid has been reaped.
    ///
    /// Exits of other children are reaped and discarded; the agent may have
    /// spawned processes of its own that exit independently. Consumes the
    /// handle, so the pid cannot be signaled after reaping.
    pub async fn reap(self, options: &ReapOptions) -> Result<(), ReapError> {
        await_exit(self.pid, wait_any_child, options).await
    }
}

/// Reap one exited child, if any. `Ok(None)` means no child has exited yet.
fn wait_any_child() -> Result<Option<Pid>, ReapError> {
    match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::Exited(pid, code)) => {
            debug!(pid = pid.as_raw(), code, "reaped exited child");
            Ok(Some(pid))
        }
        Ok(WaitStatus::Signaled(pid, signal, _)) => {
            debug!(pid = pid.as_raw(), signal = ?signal, "reaped signaled child");
            Ok(Some(pid))
        }
        Ok(_) => Ok(None),
        Err(errno) => Err(ReapError::Wait(errno)),
    }
}

/// Drain exit notifications until `target` appears.
///
/// Non-matching pids are discarded without sleeping; the poll sleep only
/// applies when no child has exited at all.
async fn await_exit<F>(target: Pid, mut next_exit: F, options: &ReapOptions) -> Result<(), ReapError>
where
    F: FnMut() -> Result<Option<Pid>, ReapError>,
{
    let started = Instant::now();

    loop {
        match next_exit()? {
            Some(pid) if pid == target => return Ok(()),
            Some(pid) => {
                debug!(
                    pid = pid.as_raw(),
                    target = target.as_raw(),
                    "ignoring unrelated child exit"
                );
            }
            None => {
                if let Some(limit) = options.timeout {
                    if started.elapsed() >= limit {
                        return Err(ReapError::Timeout {
                            pid: target.as_raw(),
                            elapsed: started.elapsed(),
                        });
                    }
                }
                tokio::time::sleep(options.poll_interval).await;
            }
        }
    }
}
