//! Live-failure scenario driver.
//!
//! Drives a chaos scenario against a MongoDB cluster managed by the MMS
//! automation agent: publish a declarative topology, launch the agent,
//! wait for the cluster to converge, hand control to the scenario body,
//! then reverse the declaration and tear everything down.
//!
//! ## Modules
//!
//! - `agent`: automation agent launch, signaling, and reaping
//! - `config`: CLI surface and resolved driver configuration
//! - `scenario`: the lifecycle orchestrator
//! - `watcher`: incremental goal state detection over the agent log

pub mod agent;
pub mod config;
pub mod error;
pub mod scenario;
pub mod watcher;

pub use agent::{AgentSupervisor, ReapOptions};
pub use config::{Cli, DriverConfig};
pub use error::{LaunchError, ReapError, ScenarioError, WatchError};
pub use scenario::{RunningScenario, Scenario, TOMBSTONE_CONTENT};
pub use watcher::{await_goal, goal_state_message, LogCursor, WatchOptions};
