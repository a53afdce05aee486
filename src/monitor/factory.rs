use std::sync::Arc;

use crate::graph::Node;
use crate::report::Runner;
use crate::scenario::ScenarioFactory;

use super::{ContainerMonitor, LeafMonitor, Monitor, MonitorConfig};

/// Produces the monitor wrapping a node.
///
/// Implementations inspect the node's kind and decide between a leaf
/// monitor and a recursively set up container monitor. Must be safe to
/// call concurrently for sibling nodes. Returning `None` for a node the
/// caller was told to wrap is a contract violation, not a recoverable
/// error.
pub trait MonitorFactory: Send + Sync {
    fn create(
        self: Arc<Self>,
        node: &Node,
        runner: &Arc<Runner>,
        parent: Option<&Arc<dyn Monitor>>,
    ) -> Option<Arc<dyn Monitor>>;
}

/// Default polymorphic factory: container kinds get a [`ContainerMonitor`]
/// constructed and set up recursively, leaves get a [`LeafMonitor`].
pub struct DefaultMonitorFactory {
    config: MonitorConfig,
    scenarios: Arc<dyn ScenarioFactory>,
}

impl DefaultMonitorFactory {
    pub fn new(config: MonitorConfig, scenarios: Arc<dyn ScenarioFactory>) -> Self {
        Self { config, scenarios }
    }
}

impl MonitorFactory for DefaultMonitorFactory {
    fn create(
        self: Arc<Self>,
        node: &Node,
        runner: &Arc<Runner>,
        parent: Option<&Arc<dyn Monitor>>,
    ) -> Option<Arc<dyn Monitor>> {
        if node.is_container() {
            let factory: Arc<dyn MonitorFactory> = self.clone();
            let monitor = match ContainerMonitor::new(
                node.clone(),
                Arc::clone(runner),
                parent,
                &self.config,
                &self.scenarios,
                factory,
            ) {
                Ok(monitor) => monitor,
                Err(err) => {
                    log::error!(
                        "failed to create a container monitor for `{}`: {}",
                        node.name(),
                        err
                    );
                    return None;
                }
            };
            if let Err(err) = ContainerMonitor::setup(&monitor) {
                log::warn!("setup failed for the monitor of `{}`: {}", node.name(), err);
            }
            Some(monitor)
        } else {
            let monitor: Arc<dyn Monitor> = LeafMonitor::new(node.clone(), Arc::clone(runner), parent);
            Some(monitor)
        }
    }
}
