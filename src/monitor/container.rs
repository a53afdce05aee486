use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::graph::{CursorStep, ListenerId, Node, NodeId, NodeKind};
use crate::report::Runner;
use crate::scenario::{Scenario, ScenarioFactory};

use super::{Error, Monitor, MonitorBase, MonitorConfig, MonitorFactory, MonitorSnapshot, Result};

/// Monitor for a container node, mirroring the container's children as an
/// ordered collection of child monitors.
///
/// The collection is fed from two paths that converge on one append
/// protocol: a one-shot enumeration of the children present at setup time,
/// and a child-added listener that stays registered for the monitor's
/// remaining lifetime. A per-node identity guard keeps a child that both
/// paths report from being wrapped twice.
pub struct ContainerMonitor {
    base: MonitorBase,
    factory: Arc<dyn MonitorFactory>,
    children: Mutex<ChildSet>,
    scenario: Mutex<Option<Arc<Scenario>>>,
    listener: Mutex<Option<ListenerId>>,
}

#[derive(Default)]
struct ChildSet {
    monitors: Vec<Arc<dyn Monitor>>,
    wrapped: HashSet<NodeId>,
    disposed: bool,
}

impl std::fmt::Debug for ContainerMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerMonitor")
            .field("target", &self.base.target().name())
            .finish_non_exhaustive()
    }
}

impl ContainerMonitor {
    /// Creates a monitor for `target` and runs scenario selection.
    ///
    /// Scenario selection applies only to [`NodeKind::Pipeline`] targets;
    /// see [`MonitorConfig::scenario`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAContainer`] if `target` is a leaf.
    pub fn new(
        target: Node,
        runner: Arc<Runner>,
        parent: Option<&Arc<dyn Monitor>>,
        config: &MonitorConfig,
        scenarios: &Arc<dyn ScenarioFactory>,
        factory: Arc<dyn MonitorFactory>,
    ) -> Result<Arc<Self>> {
        if !target.is_container() {
            return Err(Error::NotAContainer {
                name: target.name().to_owned(),
                kind: target.kind(),
            });
        }

        let monitor = Arc::new(Self {
            base: MonitorBase::new(target, runner, parent),
            factory,
            children: Mutex::new(ChildSet::default()),
            scenario: Mutex::new(None),
            listener: Mutex::new(None),
        });
        monitor.select_scenario(config, scenarios);
        Ok(monitor)
    }

    /// Registers the child-added listener and enumerates the children
    /// already present, wrapping each one.
    ///
    /// The listener is registered before enumeration starts, so a child
    /// attached concurrently is seen by at least one of the two paths; the
    /// wrap protocol collapses a child seen by both into one monitor. The
    /// listener stays active until [`dispose`], whatever enumeration does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAContainer`] if the target is not a container
    /// kind. The caller decides whether to keep the monitor.
    ///
    /// [`dispose`]: ContainerMonitor::dispose
    pub fn setup(this: &Arc<Self>) -> Result<()> {
        let target = this.base.target().clone();
        if !target.is_container() {
            log::warn!(
                "trying to set up a container monitor on `{}` (kind: {})",
                target.name(),
                target.kind()
            );
            return Err(Error::NotAContainer {
                name: target.name().to_owned(),
                kind: target.kind(),
            });
        }

        log::debug!("setting up monitor for container `{}`", target.name());

        let weak = Arc::downgrade(this);
        let listener = target.on_child_added(move |container, child| {
            if let Some(monitor) = weak.upgrade() {
                Self::child_added(&monitor, container, child);
            }
        });
        *this
            .listener
            .lock()
            .expect("listener handle lock poisoned") = Some(listener);

        let mut cursor = target.children();
        loop {
            match cursor.next() {
                CursorStep::Item(child) => Self::wrap_child(this, &child),
                CursorStep::Resync => cursor.resync(),
                CursorStep::Error | CursorStep::Done => break,
            }
        }

        Ok(())
    }

    fn select_scenario(&self, config: &MonitorConfig, scenarios: &Arc<dyn ScenarioFactory>) {
        // scenarios only make sense for whole pipelines
        if self.base.target().kind() != NodeKind::Pipeline {
            return;
        }
        let Some(selector) = config.scenario.as_ref() else {
            return;
        };
        if !selector.matches(self.base.target().name()) {
            log::info!(
                "not attaching scenario `{}` to `{}`: name does not match pattern `{}`",
                selector.name(),
                self.base.target().name(),
                selector.pattern().map(|p| p.as_glob()).unwrap_or_default()
            );
            return;
        }
        *self.scenario.lock().expect("scenario lock poisoned") =
            scenarios.create(self.base.runner(), self.base.target(), selector.name());
    }

    /// Child-added listener target. Both this and setup enumeration funnel
    /// into [`wrap_child`].
    ///
    /// [`wrap_child`]: ContainerMonitor::wrap_child
    fn child_added(this: &Arc<Self>, container: &Node, child: &Node) {
        if container.id() != this.base.target().id() {
            log::error!(
                "child-added for container `{}` delivered to the monitor of `{}`",
                container.name(),
                this.base.target().name()
            );
            debug_assert!(false, "child-added notification routed to the wrong monitor");
            return;
        }
        Self::wrap_child(this, child);
    }

    fn wrap_child(this: &Arc<Self>, node: &Node) {
        {
            let children = this.children.lock().expect("child set lock poisoned");
            if children.disposed || children.wrapped.contains(&node.id()) {
                return;
            }
        }

        log::debug!(
            "wrapping node `{}` under `{}`",
            node.name(),
            this.base.target().name()
        );

        // The factory may recurse into a nested container setup and take
        // locks at lower tree levels; it must run outside the child set
        // lock.
        let parent: Arc<dyn Monitor> = this.clone();
        let monitor = this
            .factory
            .clone()
            .create(node, this.base.runner(), Some(&parent))
            .expect("monitor factory returned no monitor");

        let mut children = this.children.lock().expect("child set lock poisoned");
        if children.disposed || !children.wrapped.insert(node.id()) {
            // Lost the race against a concurrent wrap of the same node, or
            // against disposal; this monitor never enters the collection.
            drop(children);
            monitor.dispose();
            return;
        }
        children.monitors.push(monitor);
    }

    /// Unregisters the listener, releases the scenario, and disposes every
    /// child monitor. Must be invoked at most once; the collection accepts
    /// no further mutation afterwards.
    pub fn dispose(&self) {
        if let Some(listener) = self
            .listener
            .lock()
            .expect("listener handle lock poisoned")
            .take()
        {
            self.base.target().remove_child_added_listener(listener);
        }

        self.scenario.lock().expect("scenario lock poisoned").take();

        let drained: Vec<Arc<dyn Monitor>> = {
            let mut children = self.children.lock().expect("child set lock poisoned");
            children.disposed = true;
            children.wrapped.clear();
            children.monitors.drain(..).collect()
        };
        // Each child serializes on its own lock; ours is already released.
        for child in drained {
            child.dispose();
        }
    }

    /// Current child monitors, in observation order.
    pub fn child_monitors(&self) -> Vec<Arc<dyn Monitor>> {
        self.children
            .lock()
            .expect("child set lock poisoned")
            .monitors
            .clone()
    }

    pub fn child_count(&self) -> usize {
        self.children
            .lock()
            .expect("child set lock poisoned")
            .monitors
            .len()
    }

    pub fn scenario(&self) -> Option<Arc<Scenario>> {
        self.scenario
            .lock()
            .expect("scenario lock poisoned")
            .clone()
    }

    /// Whether the child-added listener is currently registered.
    pub fn has_listener(&self) -> bool {
        self.listener
            .lock()
            .expect("listener handle lock poisoned")
            .is_some()
    }
}

impl Monitor for ContainerMonitor {
    fn target(&self) -> &Node {
        self.base.target()
    }

    fn runner(&self) -> &Arc<Runner> {
        self.base.runner()
    }

    fn parent(&self) -> Option<Arc<dyn Monitor>> {
        self.base.parent()
    }

    fn dispose(&self) {
        ContainerMonitor::dispose(self);
    }

    fn snapshot(&self) -> MonitorSnapshot {
        let children = self.child_monitors();
        MonitorSnapshot {
            node: self.base.target().name().to_owned(),
            kind: self.base.target().kind(),
            scenario: self.scenario().map(|s| s.name().to_owned()),
            children: children.iter().map(|child| child.snapshot()).collect(),
        }
    }

    fn as_container(&self) -> Option<&ContainerMonitor> {
        Some(self)
    }
}
