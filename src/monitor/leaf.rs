use std::sync::Arc;

use crate::graph::Node;
use crate::report::Runner;

use super::{Monitor, MonitorBase, MonitorSnapshot};

/// Monitor for a leaf processing node.
///
/// Holds only the shared base state; the checks a leaf monitor performs
/// against its node are supplied by external collaborators reporting into
/// the runner.
pub struct LeafMonitor {
    base: MonitorBase,
}

impl LeafMonitor {
    pub fn new(target: Node, runner: Arc<Runner>, parent: Option<&Arc<dyn Monitor>>) -> Arc<Self> {
        Arc::new(Self {
            base: MonitorBase::new(target, runner, parent),
        })
    }
}

impl Monitor for LeafMonitor {
    fn target(&self) -> &Node {
        self.base.target()
    }

    fn runner(&self) -> &Arc<Runner> {
        self.base.runner()
    }

    fn parent(&self) -> Option<Arc<dyn Monitor>> {
        self.base.parent()
    }

    fn dispose(&self) {}

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            node: self.base.target().name().to_owned(),
            kind: self.base.target().kind(),
            scenario: None,
            children: Vec::new(),
        }
    }
}
