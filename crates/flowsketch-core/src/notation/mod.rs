//! Text notation for flowcharts.
//!
//! ```text
//! graph TD
//!     A((Start))
//!     B{Ready?}
//!     C[Ship it]
//!     A --> B
//!     B -->|yes| C
//! ```
//!
//! Export always produces the canonical forms above. Import is line-oriented
//! and tolerant: lines it cannot classify are skipped, never rejected.

mod reader;
mod writer;

pub use reader::{EdgeLine, LineKind, NodeLine, classify_line};
pub use writer::{sanitize_edge_label, sanitize_node_label};

use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// First line of every exported document.
pub const HEADER: &str = "graph TD";

/// Where imported nodes are placed: a single column, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportLayout {
    pub x: f64,
    pub base_y: f64,
    pub step: f64,
}

impl Default for ImportLayout {
    fn default() -> Self {
        Self {
            x: 250.0,
            base_y: 50.0,
            step: 120.0,
        }
    }
}

/// Line counts gathered while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub nodes: usize,
    pub edges: usize,
    /// Non-blank lines that were neither header, comment, node nor edge.
    pub skipped: usize,
}

impl ParseReport {
    /// Whether the input produced neither nodes nor edges.
    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.edges == 0
    }
}

/// Result of [`parse`].
#[derive(Debug, Clone)]
pub struct ParsedNotation {
    pub graph: Graph,
    pub report: ParseReport,
}

/// Serialize a graph. Dangling edges are left out.
pub fn generate(graph: &Graph) -> String {
    writer::write_graph(graph)
}

/// Parse notation with the default layout.
pub fn parse(text: &str) -> ParsedNotation {
    parse_with_layout(text, ImportLayout::default())
}

/// Parse notation, stacking new nodes according to `layout`.
pub fn parse_with_layout(text: &str, layout: ImportLayout) -> ParsedNotation {
    reader::read_graph(text, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, NodeKind};
    use kurbo::Point;
    use std::collections::BTreeSet;

    fn edge_set(graph: &Graph) -> BTreeSet<(String, String, Option<String>)> {
        graph
            .edges()
            .iter()
            .map(|e| {
                (
                    e.source.to_string(),
                    e.target.to_string(),
                    e.display_label().map(str::to_string),
                )
            })
            .collect()
    }

    fn node_set(graph: &Graph) -> BTreeSet<(String, String, String)> {
        graph
            .nodes()
            .iter()
            .map(|n| (n.id().to_string(), n.kind.name().to_string(), n.label.clone()))
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Terminal, Point::new(0.0, 0.0)).id().clone();
        let check = graph.add_node(NodeKind::Decision, Point::new(0.0, 100.0)).id().clone();
        let work = graph.add_node(NodeKind::Process, Point::new(200.0, 100.0)).id().clone();
        let done = graph.add_node(NodeKind::Terminal, Point::new(0.0, 300.0)).id().clone();
        graph.relabel_node(&done, "End");
        graph.relabel_node(&work, "Do the work");
        graph.connect(&start, &check);
        let yes = graph.connect(&check, &work).unwrap().id().clone();
        graph.relabel_edge(&yes, "yes");
        graph.connect(&work, &done);
        let no = graph.connect(&check, &done).unwrap().id().clone();
        graph.relabel_edge(&no, "no way");

        let parsed = parse(&generate(&graph));
        assert_eq!(node_set(&parsed.graph), node_set(&graph));
        assert_eq!(edge_set(&parsed.graph), edge_set(&graph));
        assert_eq!(parsed.report.skipped, 0);
    }

    #[test]
    fn test_round_trip_keeps_label_padding() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Process, Point::ZERO).id().clone();
        let b = graph.add_node(NodeKind::Terminal, Point::ZERO).id().clone();
        graph.relabel_node(&a, "  padded label ");
        graph.relabel_node(&b, " end");

        let parsed = parse(&generate(&graph));
        assert_eq!(parsed.graph.node(&a).unwrap().label, "  padded label ");
        assert_eq!(parsed.graph.node(&b).unwrap().label, " end");
    }

    #[test]
    fn test_round_trip_empty_edge_label() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Process, Point::ZERO).id().clone();
        let b = graph.add_node(NodeKind::Process, Point::ZERO).id().clone();
        let e = graph.connect(&a, &b).unwrap().id().clone();
        graph.relabel_edge(&e, "");

        let parsed = parse(&generate(&graph));
        assert_eq!(parsed.graph.edges()[0].label, None);
    }

    #[test]
    fn test_import_example() {
        let parsed = parse("graph TD\n A[Hello]\n B{World}\n A --> B");
        let graph = &parsed.graph;
        assert_eq!(graph.node_count(), 2);
        let a = graph.node(&NodeId::from("A")).unwrap();
        let b = graph.node(&NodeId::from("B")).unwrap();
        assert_eq!((a.kind, a.label.as_str()), (NodeKind::Process, "Hello"));
        assert_eq!((b.kind, b.label.as_str()), (NodeKind::Decision, "World"));
        assert_eq!(a.position, Point::new(250.0, 50.0));
        assert_eq!(b.position, Point::new(250.0, 170.0));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].source, NodeId::from("A"));
        assert_eq!(graph.edges()[0].target, NodeId::from("B"));
        assert_eq!(graph.edges()[0].label, None);
    }

    #[test]
    fn test_custom_layout() {
        let layout = ImportLayout {
            x: 10.0,
            base_y: 0.0,
            step: 30.0,
        };
        let parsed = parse_with_layout("A[a]\nB[b]\nC[c]", layout);
        let ys: Vec<f64> = parsed.graph.nodes().iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![0.0, 30.0, 60.0]);
        assert!(parsed.graph.nodes().iter().all(|n| n.position.x == 10.0));
    }
}
