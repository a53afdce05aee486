use crate::graph::{Node, NodeKind};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the root of a topology must be a pipeline, `{name}` declares kind {kind}")]
    RootNotAPipeline { name: String, kind: NodeKind },
    #[error("leaf node `{name}` declares children")]
    LeafWithChildren { name: String },
    #[error("node `{name}` declares kind pipeline but is not the root")]
    NestedPipeline { name: String },
    #[error(transparent)]
    Graph(#[from] crate::graph::Error),
}
pub type Result<T> = std::result::Result<T, Error>;

/// Declarative description of a pipeline topology.
///
/// The root always builds into a [`NodeKind::Pipeline`]; nested entries
/// default to [`NodeKind::Leaf`] unless they declare children (or an
/// explicit `kind`), in which case they become groups.
///
/// ```json
/// {
///   "name": "pipeline0",
///   "children": [
///     {"name": "src0"},
///     {"name": "decode0", "kind": "group", "children": [{"name": "parse0"}]},
///     {"name": "sink0"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TopologySpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TopologySpec>,
}

impl TopologySpec {
    /// Builds the described node tree, returning the root pipeline.
    pub fn build(&self) -> Result<Node> {
        if let Some(kind) = self.kind {
            if kind != NodeKind::Pipeline {
                return Err(Error::RootNotAPipeline {
                    name: self.name.clone(),
                    kind,
                });
            }
        }
        let root = Node::pipeline(&self.name)?;
        for child in &self.children {
            Self::build_into(&root, child)?;
        }
        Ok(root)
    }

    fn build_into(parent: &Node, spec: &TopologySpec) -> Result<()> {
        let kind = spec.kind.unwrap_or(if spec.children.is_empty() {
            NodeKind::Leaf
        } else {
            NodeKind::Group
        });
        match kind {
            NodeKind::Pipeline => {
                return Err(Error::NestedPipeline {
                    name: spec.name.clone(),
                });
            }
            NodeKind::Leaf if !spec.children.is_empty() => {
                return Err(Error::LeafWithChildren {
                    name: spec.name.clone(),
                });
            }
            _ => {}
        }
        let node = Node::new(&spec.name, kind)?;
        parent.add_child(&node)?;
        for child in &spec.children {
            Self::build_into(&node, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> TopologySpec {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_build_nested_topology() {
        let spec = parse(
            r#"{
                "name": "pipeline0",
                "children": [
                    {"name": "src0"},
                    {"name": "decode0", "children": [{"name": "parse0"}, {"name": "dec0"}]},
                    {"name": "sink0"}
                ]
            }"#,
        );

        let root = spec.build().unwrap();
        assert_eq!(root.kind(), NodeKind::Pipeline);
        assert_eq!(root.child_count(), 3);

        let mut cursor = root.children();
        let mut kinds = Vec::new();
        while let crate::graph::CursorStep::Item(child) = cursor.next() {
            kinds.push((child.name().to_owned(), child.kind(), child.child_count()));
        }
        assert_eq!(
            kinds,
            vec![
                ("src0".to_owned(), NodeKind::Leaf, 0),
                ("decode0".to_owned(), NodeKind::Group, 2),
                ("sink0".to_owned(), NodeKind::Leaf, 0),
            ]
        );
    }

    #[test]
    fn test_explicit_empty_group() {
        let spec = parse(r#"{"name": "p", "children": [{"name": "g", "kind": "group"}]}"#);
        let root = spec.build().unwrap();
        let mut cursor = root.children();
        match cursor.next() {
            crate::graph::CursorStep::Item(child) => {
                assert_eq!(child.kind(), NodeKind::Group);
                assert_eq!(child.child_count(), 0);
            }
            other => panic!("unexpected cursor step: {:?}", other),
        }
    }

    #[test]
    fn test_root_must_be_pipeline() {
        let spec = parse(r#"{"name": "p", "kind": "leaf"}"#);
        assert!(matches!(spec.build(), Err(Error::RootNotAPipeline { .. })));
    }

    #[test]
    fn test_leaf_with_children_is_rejected() {
        let spec = parse(
            r#"{"name": "p", "children": [{"name": "l", "kind": "leaf", "children": [{"name": "x"}]}]}"#,
        );
        assert!(matches!(spec.build(), Err(Error::LeafWithChildren { .. })));
    }

    #[test]
    fn test_nested_pipeline_is_rejected() {
        let spec = parse(r#"{"name": "p", "children": [{"name": "q", "kind": "pipeline"}]}"#);
        assert!(matches!(spec.build(), Err(Error::NestedPipeline { .. })));
    }

    #[test]
    fn test_invalid_name_propagates() {
        let spec = parse(r#"{"name": "has space"}"#);
        assert!(matches!(spec.build(), Err(Error::Graph(_))));
    }
}
