use dashmap::DashMap;

use crate::graph::{Node, NodeId};

/// Severity of a validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Issue,
    Warning,
    Critical,
}

/// A single validation result attributed to one node.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub severity: Severity,
    pub node: String,
    pub message: String,
}

/// Shared sink collecting validation results across a whole monitor tree.
///
/// One runner is created per attached tree and handed by reference to every
/// monitor; collaborators performing the actual checks report into it from
/// whatever thread they run on. The monitor core itself never mutates it.
#[derive(Debug, Default)]
pub struct Runner {
    reports: DashMap<NodeId, Vec<Report>>,
}

impl Runner {
    pub fn report(&self, node: &Node, severity: Severity, message: impl Into<String>) {
        self.reports.entry(node.id()).or_default().push(Report {
            severity,
            node: node.name().to_owned(),
            message: message.into(),
        });
    }

    /// Total number of reports collected so far.
    pub fn count(&self) -> usize {
        self.reports.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn reports_for(&self, node: &Node) -> Vec<Report> {
        self.reports
            .get(&node.id())
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// All reports, ordered by node name for stable output.
    pub fn snapshot(&self) -> Vec<Report> {
        let mut out: Vec<Report> = self
            .reports
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| a.node.cmp(&b.node));
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_reports_are_grouped_by_node() {
        let runner = Runner::default();
        let a = Node::leaf("a").unwrap();
        let b = Node::leaf("b").unwrap();

        runner.report(&a, Severity::Issue, "first");
        runner.report(&a, Severity::Critical, "second");
        runner.report(&b, Severity::Warning, "third");

        assert_eq!(runner.count(), 3);
        let for_a = runner.reports_for(&a);
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|r| r.node == "a"));
        assert!(runner.reports_for(&b)[0].severity == Severity::Warning);
    }

    #[test]
    fn test_snapshot_is_sorted_by_node_name() {
        let runner = Runner::default();
        let z = Node::leaf("z").unwrap();
        let a = Node::leaf("a").unwrap();
        runner.report(&z, Severity::Issue, "late");
        runner.report(&a, Severity::Issue, "early");

        let snapshot = runner.snapshot();
        assert_eq!(snapshot[0].node, "a");
        assert_eq!(snapshot[1].node, "z");
    }

    #[test]
    fn test_concurrent_reporting() {
        let runner = Arc::new(Runner::default());
        let nodes: Vec<Node> = (0..4)
            .map(|i| Node::leaf(format!("node{i}")).unwrap())
            .collect();

        let handles: Vec<_> = nodes
            .iter()
            .map(|node| {
                let runner = Arc::clone(&runner);
                let node = node.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        runner.report(&node, Severity::Issue, format!("report {i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(runner.count(), 400);
        for node in &nodes {
            assert_eq!(runner.reports_for(node).len(), 100);
        }
    }
}
