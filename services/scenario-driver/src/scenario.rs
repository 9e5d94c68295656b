//! Lifecycle orchestration.
//!
//! The scenario is a strictly sequential chain: publish the topology,
//! launch the agent, wait for online convergence, hand control to the
//! scenario body, then reverse the declaration, wait for shutdown
//! convergence, terminate the agent, and clean up. Each step fully
//! completes or fails fatally; there is no rollback of earlier steps.
//!
//! The online hand-off is modeled in the types: [`Scenario::launch`]
//! consumes the scenario and yields a [`RunningScenario`] that privately
//! carries the log cursor where the online wait stopped, and
//! [`RunningScenario::finish`] consumes that in turn. The offline wait can
//! only ever resume from the stored cursor, so a stale online marker can
//! never satisfy it.

use std::fs;
use std::path::Path;

use tracing::info;

use livefail_topology::{publish, Topology, TopologyCatalog};

use crate::agent::AgentSupervisor;
use crate::config::DriverConfig;
use crate::error::ScenarioError;
use crate::watcher::{await_goal, LogCursor};

/// Content of the completion tombstone.
pub const TOMBSTONE_CONTENT: &str = "Scenario completed";

/// A scenario that has not started yet.
#[derive(Debug)]
pub struct Scenario {
    config: DriverConfig,
    topology: Topology,
}

impl Scenario {
    /// Build a scenario for a validated topology document.
    pub fn new(config: DriverConfig, topology: Topology) -> Result<Self, ScenarioError> {
        topology.validate()?;
        Ok(Self { config, topology })
    }

    /// Build a scenario for a named topology out of `catalog`.
    pub fn from_catalog(
        config: DriverConfig,
        catalog: &TopologyCatalog,
        name: &str,
    ) -> Result<Self, ScenarioError> {
        let topology = catalog.resolve(name)?;
        Ok(Self { config, topology })
    }

    /// Publish the topology, launch the automation agent, and wait for the
    /// cluster to come online.
    pub async fn launch(self) -> Result<RunningScenario, ScenarioError> {
        let Self { config, topology } = self;

        info!(
            config = %config.agent_config.display(),
            processes = topology.process_count(),
            "publishing cluster topology"
        );
        publish(&topology, &config.agent_config)?;

        info!("launching the automation agent");
        let agent =
            AgentSupervisor::launch(&config.agent_bin, &config.agent_config, &config.agent_log)?;

        info!(pid = agent.pid(), "waiting for cluster to come online");
        let resume_from = await_goal(
            &config.agent_log,
            topology.process_count(),
            LogCursor::START,
            &config.watch,
        )
        .await?;

        info!(cursor = resume_from.offset(), "cluster online");
        Ok(RunningScenario {
            config,
            topology,
            agent,
            resume_from,
        })
    }
}

/// A scenario whose cluster has converged online.
///
/// This is the hand-off point: the scenario body runs while this value is
/// held, and [`RunningScenario::finish`] performs the teardown.
#[derive(Debug)]
pub struct RunningScenario {
    config: DriverConfig,
    topology: Topology,
    agent: AgentSupervisor,
    resume_from: LogCursor,
}

impl RunningScenario {
    /// Process id of the supervised automation agent.
    pub fn agent_pid(&self) -> i32 {
        self.agent.pid()
    }

    /// Reverse the declaration, wait for shutdown convergence, terminate
    /// the agent, and clean up scenario artifacts.
    pub async fn finish(self) -> Result<(), ScenarioError> {
        let Self {
            config,
            mut topology,
            agent,
            resume_from,
        } = self;

        info!("scenario complete, declaring cluster shutdown");
        topology.disable_all();
        publish(&topology, &config.agent_config)?;

        info!(
            resume_from = resume_from.offset(),
            "waiting for cluster to shut down"
        );
        await_goal(
            &config.agent_log,
            topology.process_count(),
            resume_from,
            &config.watch,
        )
        .await?;

        info!(pid = agent.pid(), "killing the automation agent");
        agent.interrupt()?;
        agent.reap(&config.reap).await?;

        remove_artifact(&config.agent_log)?;
        remove_artifact(&config.agent_config)?;

        if let Some(tombstone) = &config.tombstone_file {
            fs::write(tombstone, TOMBSTONE_CONTENT).map_err(|source| {
                ScenarioError::Tombstone {
                    path: tombstone.clone(),
                    source,
                }
            })?;
            info!(path = %tombstone.display(), "tombstone created");
        }

        Ok(())
    }
}

fn remove_artifact(path: &Path) -> Result<(), ScenarioError> {
    fs::remove_file(path).map_err(|source| ScenarioError::Cleanup {
        path: path.to_path_buf(),
        source,
    })
}
