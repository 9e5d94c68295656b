//! livefail - live-failure scenario driver.
//!
//! Publishes the selected cluster topology, launches the MMS automation
//! agent, waits for the cluster to come online, holds it there for the
//! configured interval, then declares shutdown, waits for convergence
//! again, and terminates the agent.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use livefail_driver::config::Cli;
use livefail_driver::scenario::Scenario;
use livefail_topology::TopologyCatalog;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "scenario failed");
        let mut source = e.source();
        while let Some(cause) = source {
            error!(cause = %cause, "caused by");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let topology_name = cli.topology.clone();
    let config = cli.into_config();
    let hold_online = config.hold_online;

    let catalog = TopologyCatalog::builtin();
    let scenario = Scenario::from_catalog(config, &catalog, &topology_name)?;

    let running = scenario.launch().await?;

    // The scenario body proper runs here; this driver simply holds the
    // converged cluster online before starting teardown.
    info!(
        pid = running.agent_pid(),
        secs = hold_online.as_secs(),
        "holding cluster online"
    );
    tokio::time::sleep(hold_online).await;

    running.finish().await?;

    info!("scenario finished");
    Ok(())
}
