//! Shadow monitoring tree over a live processing pipeline.
//!
//! Attaching to a pipeline produces one monitor per node: a
//! [`ContainerMonitor`] for the pipeline and every nested group, a
//! [`LeafMonitor`] for everything else. Container monitors keep their
//! child collection in sync with the underlying container for as long as
//! they live, discovering children both through a one-shot enumeration at
//! setup and through the container's child-added notification afterwards.
//!
//! The pipeline's monitor may additionally own a [`Scenario`], selected by
//! the [`MonitorConfig`]'s selector string.
//!
//! [`Scenario`]: crate::scenario::Scenario

use std::sync::Arc;

use crate::graph::{Node, NodeKind};
use crate::report::Runner;
use crate::scenario::{ScenarioFactory, ScenarioSelector};

mod base;
mod container;
mod error;
mod factory;
mod leaf;

pub use base::MonitorBase;
pub use container::ContainerMonitor;
pub use error::{Error, Result};
pub use factory::{DefaultMonitorFactory, MonitorFactory};
pub use leaf::LeafMonitor;

/// An observer bound one-to-one with a node of a live pipeline.
pub trait Monitor: Send + Sync {
    /// The observed node. The node outlives the monitor within a scoped
    /// teardown sequence; the monitor's handle never keeps a disposed
    /// tree alive on its own.
    fn target(&self) -> &Node;

    /// The tree-wide validation result sink.
    fn runner(&self) -> &Arc<Runner>;

    /// The owning container monitor, if any. `None` for the root and for
    /// monitors whose parent has already been dropped.
    fn parent(&self) -> Option<Arc<dyn Monitor>>;

    /// Releases everything the monitor holds: listener registration,
    /// scenario, child monitors. Invoke exactly once.
    fn dispose(&self);

    /// Diagnostic view of the monitor subtree.
    fn snapshot(&self) -> MonitorSnapshot;

    fn as_container(&self) -> Option<&ContainerMonitor> {
        None
    }
}

/// Configuration threaded into monitor construction.
///
/// The scenario selector is an explicit value here rather than an ambient
/// environment read; [`ScenarioSelector::from_env`] bridges the two at the
/// binary edge.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Which scenario to attach to pipeline monitors, if any.
    pub scenario: Option<ScenarioSelector>,
}

/// Serializable view of a monitor subtree, for diagnostics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonitorSnapshot {
    pub node: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MonitorSnapshot>,
}

/// Attaches a monitor tree to `pipeline` and returns the root monitor.
///
/// Builds the default polymorphic factory over `config` and `scenarios`,
/// constructs the pipeline's container monitor (running scenario
/// selection), and sets it up. Dropping the returned monitor without
/// calling [`Monitor::dispose`] leaves the listener registrations behind;
/// dispose the root to tear the whole tree down.
///
/// # Errors
///
/// Returns [`Error::NotAContainer`] if `pipeline` is a leaf node.
pub fn attach(
    pipeline: &Node,
    runner: Arc<Runner>,
    config: MonitorConfig,
    scenarios: Arc<dyn ScenarioFactory>,
) -> Result<Arc<ContainerMonitor>> {
    let factory: Arc<dyn MonitorFactory> = Arc::new(DefaultMonitorFactory::new(
        config.clone(),
        Arc::clone(&scenarios),
    ));
    let monitor = ContainerMonitor::new(
        pipeline.clone(),
        runner,
        None,
        &config,
        &scenarios,
        factory,
    )?;
    ContainerMonitor::setup(&monitor)?;
    Ok(monitor)
}
