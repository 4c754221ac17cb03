use super::HEADER;
use crate::graph::Graph;
use crate::model::{Node, NodeKind};

/// Strip the shape delimiters `[ ] ( ) { }` and flatten line breaks.
///
/// Surrounding whitespace is kept so labels survive a round trip unchanged.
pub fn sanitize_node_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '{' | '}'))
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Strip the `|` delimiter and line breaks from an edge label.
pub fn sanitize_edge_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '|' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn node_line(node: &Node) -> String {
    let label = sanitize_node_label(&node.label);
    match node.kind {
        NodeKind::Terminal => format!("{}(({}))", node.id(), label),
        NodeKind::Decision => format!("{}{{{}}}", node.id(), label),
        NodeKind::Process => format!("{}[{}]", node.id(), label),
    }
}

pub(super) fn write_graph(graph: &Graph) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for node in graph.nodes() {
        out.push_str("    ");
        out.push_str(&node_line(node));
        out.push('\n');
    }

    for edge in graph.edges() {
        if graph.is_dangling(edge) {
            log::debug!("Skipping dangling edge {} on export", edge.id());
            continue;
        }
        let label = edge.label.as_deref().map(sanitize_edge_label).unwrap_or_default();
        if label.is_empty() {
            out.push_str(&format!("    {} --> {}\n", edge.source, edge.target));
        } else {
            out.push_str(&format!("    {} -->|{}| {}\n", edge.source, label, edge.target));
        }
    }

    out
}
