//! Node geometry: sizes, anchors, connection handles and hit testing.
//!
//! Every consumer that needs to know where a node "is" (edge rendering,
//! edge labels, hit testing) goes through these functions.

use crate::model::{Node, NodeKind};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Bounding box of terminal and process nodes.
pub const BOX_SIZE: Size = Size::new(120.0, 60.0);
/// Bounding box of decision nodes.
pub const DIAMOND_SIZE: Size = Size::new(100.0, 100.0);
/// Default hit radius of connection handles, in world units.
pub const HANDLE_HIT_RADIUS: f64 = 8.0;
/// Default distance within which a point is considered on an edge.
pub const EDGE_HIT_TOLERANCE: f64 = 7.5;

/// Fixed bounding-box size for a node kind.
pub fn node_size(kind: NodeKind) -> Size {
    match kind {
        NodeKind::Decision => DIAMOND_SIZE,
        NodeKind::Terminal | NodeKind::Process => BOX_SIZE,
    }
}

impl NodeKind {
    /// Fixed bounding-box size of this kind.
    pub fn size(self) -> Size {
        node_size(self)
    }
}

/// World-space point edges attach to: the center of the node's box.
pub fn anchor_of(node: &Node) -> Point {
    let size = node_size(node.kind);
    node.position + Vec2::new(size.width / 2.0, size.height / 2.0)
}

/// World-space bounding box of a node.
pub fn node_bounds(node: &Node) -> Rect {
    Rect::from_origin_size(node.position, node_size(node.kind))
}

/// Whether a world point lies on the node body.
///
/// Decisions are hit inside the diamond inscribed in their box; other kinds use the box.
pub fn node_contains(node: &Node, point: Point) -> bool {
    match node.kind {
        NodeKind::Decision => {
            let center = anchor_of(node);
            let half = node_size(node.kind) / 2.0;
            let dx = (point.x - center.x).abs() / half.width;
            let dy = (point.y - center.y).abs() / half.height;
            dx + dy <= 1.0
        }
        NodeKind::Terminal | NodeKind::Process => node_bounds(node).contains(point),
    }
}

/// Side of a node carrying a connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleSide {
    pub const ALL: [HandleSide; 4] = [
        HandleSide::Top,
        HandleSide::Right,
        HandleSide::Bottom,
        HandleSide::Left,
    ];
}

/// World position of a connection handle: the midpoint of the matching box side.
/// For decisions these are the diamond's corners.
pub fn handle_position(node: &Node, side: HandleSide) -> Point {
    let rect = node_bounds(node);
    let center = rect.center();
    match side {
        HandleSide::Top => Point::new(center.x, rect.y0),
        HandleSide::Right => Point::new(rect.x1, center.y),
        HandleSide::Bottom => Point::new(center.x, rect.y1),
        HandleSide::Left => Point::new(rect.x0, center.y),
    }
}

/// The handle of `node` within `radius` of `point`, if any.
pub fn handle_at(node: &Node, point: Point, radius: f64) -> Option<HandleSide> {
    HandleSide::ALL
        .into_iter()
        .find(|&side| handle_position(node, side).distance(point) <= radius)
}

/// Where an edge label sits: halfway between the two anchors.
pub fn edge_label_point(start: Point, end: Point) -> Point {
    start.midpoint(end)
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind, x: f64, y: f64) -> Node {
        Node::new(kind, Point::new(x, y))
    }

    #[test]
    fn test_anchor_decision() {
        let n = node(NodeKind::Decision, 100.0, 100.0);
        assert_eq!(anchor_of(&n), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_anchor_box_kinds() {
        assert_eq!(anchor_of(&node(NodeKind::Process, 0.0, 0.0)), Point::new(60.0, 30.0));
        assert_eq!(anchor_of(&node(NodeKind::Terminal, 10.0, 20.0)), Point::new(70.0, 50.0));
    }

    #[test]
    fn test_decision_hit_is_diamond() {
        let n = node(NodeKind::Decision, 0.0, 0.0);
        assert!(node_contains(&n, Point::new(50.0, 50.0)));
        assert!(node_contains(&n, Point::new(50.0, 2.0)));
        // Box corner lies outside the diamond.
        assert!(!node_contains(&n, Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_box_hit() {
        let n = node(NodeKind::Process, 0.0, 0.0);
        assert!(node_contains(&n, Point::new(5.0, 5.0)));
        assert!(!node_contains(&n, Point::new(121.0, 5.0)));
    }

    #[test]
    fn test_handles() {
        let n = node(NodeKind::Process, 0.0, 0.0);
        assert_eq!(handle_position(&n, HandleSide::Top), Point::new(60.0, 0.0));
        assert_eq!(handle_position(&n, HandleSide::Right), Point::new(120.0, 30.0));
        assert_eq!(handle_at(&n, Point::new(118.0, 31.0), HANDLE_HIT_RADIUS), Some(HandleSide::Right));
        assert_eq!(handle_at(&n, Point::new(60.0, 30.0), HANDLE_HIT_RADIUS), None);
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((distance_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((distance_to_segment(Point::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
        assert!((distance_to_segment(Point::new(1.0, 1.0), a, a) - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_label_point() {
        let mid = edge_label_point(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        assert_eq!(mid, Point::new(5.0, 10.0));
    }
}
