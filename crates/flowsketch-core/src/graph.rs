//! The graph store: ordered nodes and edges plus every mutation on them.
//!
//! Operations are total. Unknown ids are a silent no-op (`false` / `None`),
//! so a gesture racing a delete never fails.

use crate::geometry::{self, HandleSide};
use crate::model::{Edge, EdgeId, Node, NodeId, NodeKind};
use crate::score::{ScoreAttributes, ScorePatch};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Offset applied to duplicated nodes.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Nodes and edges of one diagram.
///
/// Node order is z-order: later nodes render on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Bumped on every effective mutation.
    #[serde(skip)]
    revision: u64,
    /// Whether newly added nodes start in score mode.
    #[serde(skip)]
    score_new_nodes: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from stored parts. Edges are kept as-is, dangling or not.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            revision: 0,
            score_new_nodes: false,
        }
    }

    /// Split into nodes and edges.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    pub fn set_score_new_nodes(&mut self, enabled: bool) {
        self.score_new_nodes = enabled;
    }

    pub fn score_new_nodes(&self) -> bool {
        self.score_new_nodes
    }

    /// Change counter for render invalidation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| &e.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.touch();
    }

    /// Place a new node with the kind's default label on top of the z-order.
    pub fn add_node(&mut self, kind: NodeKind, position: Point) -> &Node {
        let mut node = Node::new(kind, position);
        if self.score_new_nodes {
            node.score = Some(ScoreAttributes::default());
        }
        self.push_node(node)
    }

    fn push_node(&mut self, node: Node) -> &Node {
        self.nodes.push(node);
        self.touch();
        let last = self.nodes.len() - 1;
        &self.nodes[last]
    }

    /// Insert a fully formed node, replacing the kind and label of an existing node with the same id.
    ///
    /// Returns `true` when a new node was appended.
    pub(crate) fn upsert_node(&mut self, node: Node) -> bool {
        if let Some(existing) = self.node_mut(&node.id) {
            existing.kind = node.kind;
            existing.label = node.label;
            self.touch();
            false
        } else {
            self.push_node(node);
            true
        }
    }

    /// Append an edge without checking its endpoints.
    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.touch();
    }

    /// Replace a node's position. Edges follow lazily through their anchors.
    pub fn move_node(&mut self, id: &NodeId, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Connect `source` to `target`.
    ///
    /// Returns `None` for self-loops, for an already existing ordered pair, and
    /// when either node is unknown.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        if source == target {
            log::debug!("Rejected self-loop on {}", source);
            return None;
        }
        if !self.contains_node(source) || !self.contains_node(target) {
            return None;
        }
        if self.edges.iter().any(|e| &e.source == source && &e.target == target) {
            log::debug!("Rejected duplicate edge {} -> {}", source, target);
            return None;
        }
        self.push_edge(Edge::new(source.clone(), target.clone()));
        self.edges.last()
    }

    /// Remove a node and every edge touching it.
    pub fn delete_node(&mut self, id: &NodeId) -> Option<Node> {
        let index = self.nodes.iter().position(|n| &n.id == id)?;
        let node = self.nodes.remove(index);
        self.edges.retain(|e| !e.touches(id));
        self.touch();
        Some(node)
    }

    /// Remove a single edge.
    pub fn delete_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let index = self.edges.iter().position(|e| &e.id == id)?;
        let edge = self.edges.remove(index);
        self.touch();
        Some(edge)
    }

    /// Clone a node (never its edges) with a new id, shifted by [`DUPLICATE_OFFSET`].
    pub fn duplicate_node(&mut self, id: &NodeId) -> Option<&Node> {
        self.duplicate_node_with_offset(id, DUPLICATE_OFFSET)
    }

    /// Clone a node shifted by `offset`.
    pub fn duplicate_node_with_offset(&mut self, id: &NodeId, offset: Vec2) -> Option<&Node> {
        let original = self.node(id)?;
        let mut copy = original.clone();
        copy.id = NodeId::generate();
        copy.position = original.position + offset;
        Some(self.push_node(copy))
    }

    /// Replace a node's label. Any text is accepted, including an empty string.
    pub fn relabel_node(&mut self, id: &NodeId, label: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.label = label.into();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Replace an edge's label.
    pub fn relabel_edge(&mut self, id: &EdgeId, label: impl Into<String>) -> bool {
        match self.edge_mut(id) {
            Some(edge) => {
                edge.label = Some(label.into());
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Turn score mode on or off for a node. Turning it on starts from default inputs
    /// unless the node already has a score.
    pub fn set_score_mode(&mut self, id: &NodeId, enabled: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                if enabled {
                    node.score.get_or_insert_with(ScoreAttributes::default);
                } else {
                    node.score = None;
                }
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Merge score inputs into a node and recompute its score.
    ///
    /// A node without a score record is switched into score mode first.
    pub fn update_score_attributes(&mut self, id: &NodeId, patch: ScorePatch) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.score
                    .get_or_insert_with(ScoreAttributes::default)
                    .apply(patch);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Front-most node whose body contains the world point.
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.nodes
            .iter()
            .rev()
            .find(|n| geometry::node_contains(n, point))
    }

    /// Front-most node under the world point, through a handle within
    /// `radius` or its body. Each node checks its handles before its body,
    /// so an upper node's body covers a lower node's handle.
    pub fn node_hit(&self, point: Point, radius: f64) -> Option<(&Node, Option<HandleSide>)> {
        self.nodes.iter().rev().find_map(|n| {
            match geometry::handle_at(n, point, radius) {
                Some(side) => Some((n, Some(side))),
                None => geometry::node_contains(n, point).then_some((n, None)),
            }
        })
    }

    /// Top-most resolvable edge passing within `tolerance` of the world point.
    pub fn edge_at(&self, point: Point, tolerance: f64) -> Option<&Edge> {
        self.edges.iter().rev().find(|e| {
            self.edge_anchors(e)
                .map(|(a, b)| geometry::distance_to_segment(point, a, b) <= tolerance)
                .unwrap_or(false)
        })
    }

    /// Anchor points of both ends, or `None` for a dangling edge.
    pub fn edge_anchors(&self, edge: &Edge) -> Option<(Point, Point)> {
        let source = self.node(&edge.source)?;
        let target = self.node(&edge.target)?;
        Some((geometry::anchor_of(source), geometry::anchor_of(target)))
    }

    /// Whether either end of the edge is missing.
    pub fn is_dangling(&self, edge: &Edge) -> bool {
        !self.contains_node(&edge.source) || !self.contains_node(&edge.target)
    }

    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| self.is_dangling(e))
    }

    /// Drop dangling edges, returning how many were removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let before = self.edges.len();
        let nodes = &self.nodes;
        self.edges.retain(|e| {
            nodes.iter().any(|n| n.id == e.source) && nodes.iter().any(|n| n.id == e.target)
        });
        let removed = before - self.edges.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }
}
