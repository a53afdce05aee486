//! pipecheck: attaches validation monitors to live processing pipelines.
//!
//! This library builds a shadow monitoring tree mirroring a pipeline of
//! processing nodes: one monitor per node, kept in sync with the pipeline
//! while nodes are added at runtime, plus an optional named scenario bound
//! to the pipeline itself. Validation results from collaborators flow into
//! a shared runner.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use monitor::{Monitor, MonitorConfig};
use report::Runner;
use scenario::{FileScenarioFactory, ScenarioFactory, ScenarioSelector};
use topology::TopologySpec;

pub mod error;
pub mod graph;
pub mod monitor;
pub mod report;
pub mod scenario;
pub mod topology;

/// Environment variable naming the topology file for the binary.
pub const TOPOLOGY_ENV: &str = "PIPECHECK_TOPOLOGY";

/// Runs the pipecheck driver.
///
/// Builds the pipeline described by the `PIPECHECK_TOPOLOGY` file, attaches
/// a monitor tree (scenario selection via `PIPECHECK_SCENARIO`, scenario
/// lookup under `PIPECHECK_SCENARIO_DIR`), and prints the monitor snapshot
/// and any collected reports as JSON.
///
/// # Errors
///
/// Possible errors include:
/// - An unreadable or invalid topology file.
/// - An invalid scenario selector.
/// - A topology whose root is not a pipeline.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let topology_path = std::env::var_os(TOPOLOGY_ENV)
        .map(PathBuf::from)
        .expect("environment variable `PIPECHECK_TOPOLOGY` must be set");
    let spec: TopologySpec = serde_json::from_reader(BufReader::new(File::open(&topology_path)?))?;
    let pipeline = spec.build()?;
    log::debug!(
        "built pipeline `{}` with {} direct children",
        pipeline.name(),
        pipeline.child_count()
    );

    let selector = ScenarioSelector::from_env()?;
    if let Some(selector) = &selector {
        log::debug!("scenario selector: `{}`", selector.name());
    }
    let config = MonitorConfig { scenario: selector };

    let runner = Arc::new(Runner::default());
    let scenarios: Arc<dyn ScenarioFactory> = Arc::new(FileScenarioFactory::from_env());
    let root = monitor::attach(&pipeline, Arc::clone(&runner), config, scenarios)?;

    println!("{}", serde_json::to_string_pretty(&root.snapshot())?);

    let reports = runner.snapshot();
    if !reports.is_empty() {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    log::info!("collected {} reports", runner.count());

    root.dispose();
    Ok(())
}
