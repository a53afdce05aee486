use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::cursor::ChildCursor;
use super::{Error, Result};

/// The maximum allowed length for a node name.
const NODE_NAME_MAX_LEN: usize = 255;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Node`], assigned at creation.
///
/// Handles to the same underlying node always compare equal by id, which
/// makes the id the key for any per-node bookkeeping (e.g. guarding against
/// wrapping the same node twice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a processing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A plain processing node without children.
    Leaf,
    /// A container nested inside another container.
    Group,
    /// The root container type. At most one per assembled tree.
    Pipeline,
}

impl NodeKind {
    /// Whether nodes of this kind may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Group | NodeKind::Pipeline)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Group => "group",
            NodeKind::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a registered child-added listener on one node.
///
/// Returned by [`Node::on_child_added`] and consumed by
/// [`Node::remove_child_added_listener`]. Valid only for the node that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type ChildAddedCallback = dyn Fn(&Node, &Node) + Send + Sync;

/// A handle to a node in a live processing tree.
///
/// Handles are cheap to clone and share the underlying node. Structural
/// mutation (`add_child`, `remove_child`) may happen from any thread;
/// child-added listeners run synchronously on the mutating thread.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

pub(super) struct NodeInner {
    id: NodeId,
    name: String,
    kind: NodeKind,
    pub(super) state: Mutex<ChildList>,
    listeners: Mutex<Vec<(ListenerId, Arc<ChildAddedCallback>)>>,
    next_listener: AtomicU64,
}

#[derive(Default)]
pub(super) struct ChildList {
    pub(super) children: Vec<Node>,
    /// Bumped on every structural change. Cursors compare against it to
    /// detect that their view went stale.
    pub(super) version: u64,
}

impl Node {
    /// Creates a node of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty, longer than 255
    /// bytes, or contains whitespace.
    pub fn new(name: impl AsRef<str>, kind: NodeKind) -> Result<Self> {
        let name = name.as_ref();
        if name.is_empty()
            || name.len() > NODE_NAME_MAX_LEN
            || name.chars().any(char::is_whitespace)
        {
            return Err(Error::InvalidName(name.to_owned()));
        }

        Ok(Self(Arc::new(NodeInner {
            id: NodeId::next(),
            name: name.to_owned(),
            kind,
            state: Mutex::new(ChildList::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        })))
    }

    pub fn leaf(name: impl AsRef<str>) -> Result<Self> {
        Self::new(name, NodeKind::Leaf)
    }

    pub fn group(name: impl AsRef<str>) -> Result<Self> {
        Self::new(name, NodeKind::Group)
    }

    pub fn pipeline(name: impl AsRef<str>) -> Result<Self> {
        Self::new(name, NodeKind::Pipeline)
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn is_container(&self) -> bool {
        self.0.kind.is_container()
    }

    /// Attaches `child` as a direct child of this node.
    ///
    /// Registered child-added listeners are invoked synchronously on the
    /// calling thread, after the child list lock has been released.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAContainer`] if this node is a leaf.
    /// - [`Error::AlreadyAdded`] if `child` is already attached here.
    pub fn add_child(&self, child: &Node) -> Result<()> {
        if !self.is_container() {
            return Err(Error::NotAContainer {
                name: self.name().to_owned(),
                kind: self.kind(),
            });
        }

        {
            let mut state = self.0.state.lock().expect("node child list lock poisoned");
            if state.children.iter().any(|c| c.id() == child.id()) {
                return Err(Error::AlreadyAdded {
                    parent: self.name().to_owned(),
                    child: child.name().to_owned(),
                });
            }
            state.children.push(child.clone());
            state.version += 1;
        }
        log::debug!("added node `{}` to `{}`", child.name(), self.name());

        for callback in self.listener_snapshot() {
            callback(self, child);
        }

        Ok(())
    }

    /// Detaches `child` from this node.
    ///
    /// There is no removal notification; observers that wrapped the child
    /// keep their wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAChild`] if `child` is not currently attached.
    pub fn remove_child(&self, child: &Node) -> Result<()> {
        let mut state = self.0.state.lock().expect("node child list lock poisoned");
        let before = state.children.len();
        state.children.retain(|c| c.id() != child.id());
        if state.children.len() == before {
            return Err(Error::NotAChild {
                parent: self.name().to_owned(),
                child: child.name().to_owned(),
            });
        }
        state.version += 1;
        Ok(())
    }

    /// Returns a restart-safe cursor over the current direct children.
    ///
    /// The cursor reports [`CursorStep::Resync`] whenever the child list
    /// changed since the cursor last synced; see [`ChildCursor`].
    ///
    /// [`CursorStep::Resync`]: super::CursorStep::Resync
    pub fn children(&self) -> ChildCursor {
        ChildCursor::new(Arc::downgrade(&self.0))
    }

    pub fn child_count(&self) -> usize {
        self.0
            .state
            .lock()
            .expect("node child list lock poisoned")
            .children
            .len()
    }

    /// Registers `callback` to run for every subsequently added direct
    /// child, with `(&container, &child)` arguments.
    pub fn on_child_added<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&Node, &Node) + Send + Sync + 'static,
    {
        let id = ListenerId(self.0.next_listener.fetch_add(1, Ordering::Relaxed));
        self.0
            .listeners
            .lock()
            .expect("node listener table lock poisoned")
            .push((id, Arc::new(callback)));
        id
    }

    /// Cancels a listener registration. Unknown ids are ignored.
    pub fn remove_child_added_listener(&self, id: ListenerId) {
        self.0
            .listeners
            .lock()
            .expect("node listener table lock poisoned")
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn listener_snapshot(&self) -> Vec<Arc<ChildAddedCallback>> {
        self.0
            .listeners
            .lock()
            .expect("node listener table lock poisoned")
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_new_rejects_invalid_names() {
        assert!(matches!(Node::leaf(""), Err(Error::InvalidName(_))));
        assert!(matches!(
            Node::leaf("has space"),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            Node::leaf("x".repeat(256)),
            Err(Error::InvalidName(_))
        ));
        assert!(Node::leaf("x".repeat(255)).is_ok());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = Node::leaf("a").unwrap();
        let b = Node::leaf("b").unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_add_child_to_leaf_fails() {
        let leaf = Node::leaf("leaf0").unwrap();
        let child = Node::leaf("child0").unwrap();
        let err = leaf.add_child(&child).unwrap_err();
        match err {
            Error::NotAContainer { name, kind } => {
                assert_eq!(name, "leaf0");
                assert_eq!(kind, NodeKind::Leaf);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_add_child_twice_fails() {
        let group = Node::group("group0").unwrap();
        let child = Node::leaf("child0").unwrap();
        group.add_child(&child).unwrap();
        assert!(matches!(
            group.add_child(&child),
            Err(Error::AlreadyAdded { .. })
        ));
        assert_eq!(group.child_count(), 1);
    }

    #[test]
    fn test_remove_child() {
        let group = Node::group("group0").unwrap();
        let child = Node::leaf("child0").unwrap();
        group.add_child(&child).unwrap();
        group.remove_child(&child).unwrap();
        assert_eq!(group.child_count(), 0);
        assert!(matches!(
            group.remove_child(&child),
            Err(Error::NotAChild { .. })
        ));
    }

    #[test]
    fn test_listener_sees_added_children() {
        let pipeline = Node::pipeline("pipeline0").unwrap();
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let listener_seen = std::sync::Arc::clone(&seen);
        pipeline.on_child_added(move |container, child| {
            listener_seen
                .lock()
                .unwrap()
                .push((container.name().to_owned(), child.name().to_owned()));
        });

        pipeline.add_child(&Node::leaf("a").unwrap()).unwrap();
        pipeline.add_child(&Node::leaf("b").unwrap()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("pipeline0".to_owned(), "a".to_owned()),
                ("pipeline0".to_owned(), "b".to_owned()),
            ]
        );
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let pipeline = Node::pipeline("pipeline0").unwrap();
        let count = std::sync::Arc::new(AtomicUsize::new(0));
        let listener_count = std::sync::Arc::clone(&count);
        let id = pipeline.on_child_added(move |_, _| {
            listener_count.fetch_add(1, Ordering::SeqCst);
        });

        pipeline.add_child(&Node::leaf("a").unwrap()).unwrap();
        pipeline.remove_child_added_listener(id);
        pipeline.add_child(&Node::leaf("b").unwrap()).unwrap();
        // removing twice is a no-op
        pipeline.remove_child_added_listener(id);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
