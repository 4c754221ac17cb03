use super::{ImportLayout, ParseReport, ParsedNotation};
use crate::graph::Graph;
use crate::model::{Edge, Node, NodeId, NodeKind};
use kurbo::Point;

/// A parsed edge line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

/// A parsed node line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLine {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
}

/// Classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Header,
    Edge(EdgeLine),
    Node(NodeLine),
    Unrecognized,
}

/// Shape delimiters, longest first so `((` wins over `(`-less forms.
const SHAPES: [(&str, &str, NodeKind); 5] = [
    ("(([", "]))", NodeKind::Terminal),
    ("((", "))", NodeKind::Terminal),
    ("([", "])", NodeKind::Terminal),
    ("[", "]", NodeKind::Process),
    ("{", "}", NodeKind::Decision),
];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_ident_char)
}

fn non_empty(label: &str) -> Option<String> {
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// Classify a single line. Edges are tried before nodes.
pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim();
    let line = line.strip_suffix(';').map(str::trim_end).unwrap_or(line);

    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with("%%") {
        return LineKind::Comment;
    }
    if let Some(first) = line.split_whitespace().next() {
        if first.eq_ignore_ascii_case("graph") || first.eq_ignore_ascii_case("flowchart") {
            return LineKind::Header;
        }
    }
    if let Some(edge) = parse_edge(line) {
        return LineKind::Edge(edge);
    }
    if let Some(node) = parse_node(line) {
        return LineKind::Node(node);
    }
    LineKind::Unrecognized
}

/// `A -->|L| B`, `A --> B` and `A -- L --> B`.
fn parse_edge(line: &str) -> Option<EdgeLine> {
    for (idx, arrow) in line.match_indices("-->") {
        let source = line[..idx].trim();
        if !is_ident(source) {
            continue;
        }
        let rest = line[idx + arrow.len()..].trim_start();
        if let Some(piped) = rest.strip_prefix('|') {
            let Some(end) = piped.find('|') else {
                continue;
            };
            let target = piped[end + 1..].trim();
            if is_ident(target) {
                return Some(EdgeLine {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: non_empty(&piped[..end]),
                });
            }
        } else if is_ident(rest.trim_end()) {
            return Some(EdgeLine {
                source: source.to_string(),
                target: rest.trim_end().to_string(),
                label: None,
            });
        }
    }

    let open = line.find("--")?;
    let source = line[..open].trim();
    if !is_ident(source) {
        return None;
    }
    let rest = &line[open + 2..];
    rest.match_indices("-->").find_map(|(idx, arrow)| {
        let label = non_empty(&rest[..idx])?;
        let target = rest[idx + arrow.len()..].trim();
        is_ident(target).then(|| EdgeLine {
            source: source.to_string(),
            target: target.to_string(),
            label: Some(label),
        })
    })
}

/// `id` followed by one of the shape forms, with matching delimiters.
/// The label between the delimiters is taken verbatim.
fn parse_node(line: &str) -> Option<NodeLine> {
    let id_len = line.find(|c: char| !is_ident_char(c)).unwrap_or(line.len());
    if id_len == 0 {
        return None;
    }
    let (id, shape) = line.split_at(id_len);
    let shape = shape.trim();

    SHAPES.iter().find_map(|&(open, close, kind)| {
        let inner = shape.strip_prefix(open)?.strip_suffix(close)?;
        Some(NodeLine {
            id: id.to_string(),
            kind,
            label: inner.to_string(),
        })
    })
}

pub(super) fn read_graph(text: &str, layout: ImportLayout) -> ParsedNotation {
    let mut graph = Graph::new();
    let mut report = ParseReport::default();
    let mut y = layout.base_y;

    for (number, line) in text.lines().enumerate() {
        match classify_line(line) {
            LineKind::Blank | LineKind::Comment | LineKind::Header => {}
            LineKind::Edge(edge) => {
                graph.push_edge(
                    Edge::new(NodeId::from(edge.source), NodeId::from(edge.target))
                        .with_label(edge.label),
                );
                report.edges += 1;
            }
            LineKind::Node(parsed) => {
                let node = Node::with_id(
                    NodeId::from(parsed.id),
                    parsed.kind,
                    Point::new(layout.x, y),
                    parsed.label,
                );
                if graph.upsert_node(node) {
                    y += layout.step;
                    report.nodes += 1;
                }
            }
            LineKind::Unrecognized => {
                log::debug!("Skipping unrecognized line {}: {:?}", number + 1, line.trim());
                report.skipped += 1;
            }
        }
    }

    log::debug!(
        "Parsed {} nodes and {} edges ({} lines skipped)",
        report.nodes,
        report.edges,
        report.skipped
    );
    ParsedNotation { graph, report }
}
