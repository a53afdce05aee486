use std::sync::Weak;

use super::node::{Node, NodeInner};

/// Outcome of a single [`ChildCursor::next`] call.
#[derive(Debug)]
pub enum CursorStep {
    /// The next child in the traversal.
    Item(Node),
    /// The child list changed since the cursor last synced. The traversal
    /// position is stale; call [`ChildCursor::resync`] and start over.
    Resync,
    /// The underlying node no longer exists.
    Error,
    /// The traversal reached the end of the current child list.
    Done,
}

/// Restart-safe enumeration cursor over a node's direct children.
///
/// The cursor never pins the child list: each `next()` takes the list lock
/// only long enough to read one entry. Concurrent mutation is detected via
/// the node's version counter and reported as [`CursorStep::Resync`],
/// repeatedly, until the caller acknowledges with [`resync`], which restarts
/// the traversal from the beginning. Callers must therefore tolerate
/// re-visiting children they already handled.
///
/// [`resync`]: ChildCursor::resync
pub struct ChildCursor {
    owner: Weak<NodeInner>,
    pos: usize,
    version: u64,
}

impl ChildCursor {
    pub(super) fn new(owner: Weak<NodeInner>) -> Self {
        let version = owner
            .upgrade()
            .map(|inner| {
                inner
                    .state
                    .lock()
                    .expect("node child list lock poisoned")
                    .version
            })
            .unwrap_or(0);
        Self {
            owner,
            pos: 0,
            version,
        }
    }

    pub fn next(&mut self) -> CursorStep {
        let Some(inner) = self.owner.upgrade() else {
            return CursorStep::Error;
        };
        let state = inner.state.lock().expect("node child list lock poisoned");
        if state.version != self.version {
            return CursorStep::Resync;
        }
        match state.children.get(self.pos) {
            Some(child) => {
                self.pos += 1;
                CursorStep::Item(child.clone())
            }
            None => CursorStep::Done,
        }
    }

    /// Restarts the traversal from the beginning against the current child
    /// list. Already-consumed items will be yielded again.
    pub fn resync(&mut self) {
        self.pos = 0;
        if let Some(inner) = self.owner.upgrade() {
            self.version = inner
                .state
                .lock()
                .expect("node child list lock poisoned")
                .version;
        }
    }
}
