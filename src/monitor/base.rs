use std::sync::{Arc, Weak};

use crate::graph::Node;
use crate::report::Runner;

use super::Monitor;

/// State shared by every monitor: the target node handle, the tree-wide
/// runner, and the optional parent back-reference.
///
/// The parent reference is weak. Parents own their children, never the
/// other way around, so a monitor tree tears down strictly top-down.
pub struct MonitorBase {
    target: Node,
    runner: Arc<Runner>,
    parent: Option<Weak<dyn Monitor>>,
}

impl MonitorBase {
    pub(super) fn new(target: Node, runner: Arc<Runner>, parent: Option<&Arc<dyn Monitor>>) -> Self {
        Self {
            target,
            runner,
            parent: parent.map(Arc::downgrade),
        }
    }

    pub fn target(&self) -> &Node {
        &self.target
    }

    pub fn runner(&self) -> &Arc<Runner> {
        &self.runner
    }

    pub fn parent(&self) -> Option<Arc<dyn Monitor>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}
