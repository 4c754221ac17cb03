//! Render-ready view of a graph.
//!
//! A [`Scene`] holds only derived geometry. Renderers draw it with
//! `transform` applied; they never read the graph directly.

use crate::geometry::{self, HandleSide};
use crate::graph::Graph;
use crate::interaction::InteractionController;
use crate::model::{EdgeId, NodeId, NodeKind};
use kurbo::{Affine, Line, Point, Rect};
use peniko::Color;

/// Fill colour for a node kind.
pub fn kind_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Terminal => Color::from_rgba8(16, 185, 129, 255),
        NodeKind::Process => Color::from_rgba8(99, 102, 241, 255),
        NodeKind::Decision => Color::from_rgba8(249, 115, 22, 255),
    }
}

/// Stroke colour for edges and the transient connection line.
pub const EDGE_COLOR: Color = Color::from_rgba8(100, 116, 139, 255);

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// World-space bounding box.
    pub bounds: Rect,
    pub label: String,
    pub fill: Color,
    pub score: Option<f64>,
    pub handles: [(HandleSide, Point); 4],
}

#[derive(Debug, Clone)]
pub struct SceneEdge {
    pub id: EdgeId,
    pub line: Line,
    pub label: Option<String>,
    pub label_point: Point,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    /// World to screen.
    pub transform: Affine,
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    /// World-space line being dragged out of a handle.
    pub connection: Option<Line>,
}

impl Scene {
    /// Build from the store and the controller. Dangling edges are left out.
    pub fn build(graph: &Graph, controller: &InteractionController) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| SceneNode {
                id: node.id().clone(),
                kind: node.kind,
                bounds: geometry::node_bounds(node),
                label: node.label.clone(),
                fill: kind_color(node.kind),
                score: node.score_value(),
                handles: HandleSide::ALL.map(|side| (side, geometry::handle_position(node, side))),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let (start, end) = graph.edge_anchors(edge)?;
                Some(SceneEdge {
                    id: edge.id().clone(),
                    line: Line::new(start, end),
                    label: edge.display_label().map(str::to_string),
                    label_point: geometry::edge_label_point(start, end),
                })
            })
            .collect();

        let connection = controller
            .connection_line()
            .map(|(start, end)| Line::new(start.0, end.0));

        Self {
            transform: controller.viewport().transform(),
            nodes,
            edges,
            connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, PointerEvent};
    use crate::model::Edge;
    use crate::viewport::ScreenPoint;
    use kurbo::Vec2;

    #[test]
    fn test_scene_geometry() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Decision, Point::new(100.0, 100.0)).id().clone();
        let b = graph.add_node(NodeKind::Process, Point::new(300.0, 100.0)).id().clone();
        let e = graph.connect(&a, &b).unwrap().id().clone();
        graph.relabel_edge(&e, "yes");
        graph.push_edge(Edge::new(a.clone(), NodeId::from("ghost")));

        let mut controller = InteractionController::default();
        controller.viewport_mut().set_offset(Vec2::new(5.0, 5.0));
        let scene = Scene::build(&graph, &controller);

        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.nodes[0].bounds, Rect::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(scene.nodes[0].fill, kind_color(NodeKind::Decision));
        assert_eq!(scene.edges.len(), 1);
        let edge = &scene.edges[0];
        assert_eq!(edge.line, Line::new((150.0, 150.0), (360.0, 130.0)));
        assert_eq!(edge.label_point, Point::new(255.0, 140.0));
        assert_eq!(edge.label.as_deref(), Some("yes"));
        assert_eq!(scene.transform, Affine::translate((5.0, 5.0)));
        assert!(scene.connection.is_none());
    }

    #[test]
    fn test_scene_connection_line() {
        let mut graph = Graph::new();
        graph.add_node(NodeKind::Process, Point::ZERO);
        let mut controller = InteractionController::default();
        controller.handle_pointer_event(
            &mut graph,
            &PointerEvent::Down {
                position: ScreenPoint::new(120.0, 30.0),
                button: MouseButton::Left,
            },
        );
        controller.handle_pointer_event(
            &mut graph,
            &PointerEvent::Move {
                position: ScreenPoint::new(200.0, 90.0),
            },
        );
        let scene = Scene::build(&graph, &controller);
        assert_eq!(scene.connection, Some(Line::new((120.0, 30.0), (200.0, 90.0))));
    }
}
