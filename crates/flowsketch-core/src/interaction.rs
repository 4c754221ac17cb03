//! Pointer interaction: node dragging, handle-drag connecting and panning.
//!
//! The controller is a small state machine over [`Gesture`]. At most one
//! gesture runs at a time; a pointer-down while a gesture is active is
//! ignored until that gesture's pointer-up.

use crate::config::EditorConfig;
use crate::geometry::{self, HandleSide, EDGE_HIT_TOLERANCE, HANDLE_HIT_RADIUS};
use crate::graph::Graph;
use crate::input::{InputState, KeyEvent, MouseButton, PointerEvent};
use crate::model::{EdgeId, NodeId};
use crate::viewport::{ScreenPoint, Viewport, WorldPoint};
use kurbo::Vec2;

/// The active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// A node follows the pointer.
    DraggingNode {
        node: NodeId,
        /// Pointer minus the node's screen position at grab time.
        grab_offset: Vec2,
    },
    /// A connection line is being pulled out of a handle.
    Connecting {
        source: NodeId,
        start: WorldPoint,
        endpoint: WorldPoint,
    },
    /// The view follows the pointer.
    Panning {
        /// Pointer position at pan start.
        origin: ScreenPoint,
        /// View offset at pan start.
        origin_offset: Vec2,
    },
}

/// What lies under a screen point.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Handle(NodeId, HandleSide),
    Node(NodeId),
    Edge(EdgeId),
    Canvas,
}

impl HitTarget {
    /// The node under the point, through its body or one of its handles.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            HitTarget::Handle(id, _) | HitTarget::Node(id) => Some(id),
            HitTarget::Edge(_) | HitTarget::Canvas => None,
        }
    }
}

/// Result of a finished gesture or a recognised click.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Connected(EdgeId),
    /// Released over a node, but the store refused the edge.
    ConnectionRejected,
    /// Released over empty canvas.
    ConnectionDiscarded,
    NodeDropped(NodeId),
    PanFinished,
    DoubleClick(HitTarget),
}

/// Turns pointer and key events into graph mutations and view changes.
#[derive(Debug, Clone)]
pub struct InteractionController {
    gesture: Gesture,
    viewport: Viewport,
    input: InputState,
    pan_key: String,
    handle_radius: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new("Space", HANDLE_HIT_RADIUS)
    }
}

impl InteractionController {
    pub fn new(pan_key: impl Into<String>, handle_radius: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            viewport: Viewport::new(),
            input: InputState::new(),
            pan_key: pan_key.into(),
            handle_radius,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.pan_key.clone(), config.handle_radius)
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Whether the pan modifier is currently held.
    pub fn pan_key_held(&self) -> bool {
        self.input.is_key_pressed(&self.pan_key)
    }

    /// Resolve what is under a screen point. Nodes are tried front to back,
    /// each by handle then body; edges only when no node is hit.
    pub fn hit_test(&self, graph: &Graph, position: ScreenPoint) -> HitTarget {
        let world = self.viewport.to_world(position).0;
        match graph.node_hit(world, self.handle_radius) {
            Some((node, Some(side))) => return HitTarget::Handle(node.id().clone(), side),
            Some((node, None)) => return HitTarget::Node(node.id().clone()),
            None => {}
        }
        if let Some(edge) = graph.edge_at(world, EDGE_HIT_TOLERANCE) {
            return HitTarget::Edge(edge.id().clone());
        }
        HitTarget::Canvas
    }

    /// Transient connection line in world space while connecting.
    pub fn connection_line(&self) -> Option<(WorldPoint, WorldPoint)> {
        match self.gesture {
            Gesture::Connecting {
                start, endpoint, ..
            } => Some((start, endpoint)),
            _ => None,
        }
    }

    /// Force the idle state, dropping any half-finished gesture.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            log::debug!("Cancelling gesture {:?}", self.gesture);
        }
        self.gesture = Gesture::Idle;
    }

    /// Cancel and forget held keys, e.g. when the window loses focus.
    pub fn reset_input(&mut self) {
        self.cancel();
        self.input.release_all();
    }

    pub fn handle_pointer_event(
        &mut self,
        graph: &mut Graph,
        event: &PointerEvent,
    ) -> Option<InteractionOutcome> {
        self.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down { position, button } => self.pointer_down(graph, position, button),
            PointerEvent::Move { position } => {
                self.pointer_move(graph, position);
                None
            }
            PointerEvent::Up { position, button } => self.pointer_up(graph, position, button),
        }
    }

    /// Track modifier keys. Releasing the pan key ends a pan; it never touches other gestures.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Option<InteractionOutcome> {
        self.input.handle_key_event(event);
        match event {
            KeyEvent::Released(key)
                if key.eq_ignore_ascii_case(&self.pan_key)
                    && matches!(self.gesture, Gesture::Panning { .. }) =>
            {
                self.gesture = Gesture::Idle;
                Some(InteractionOutcome::PanFinished)
            }
            _ => None,
        }
    }

    fn pointer_down(
        &mut self,
        graph: &Graph,
        position: ScreenPoint,
        button: MouseButton,
    ) -> Option<InteractionOutcome> {
        if button != MouseButton::Left {
            return None;
        }
        if !self.is_idle() {
            log::debug!("Ignoring pointer-down during {:?}", self.gesture);
            return None;
        }

        let target = self.hit_test(graph, position);
        if self.input.is_double_click() && target != HitTarget::Canvas {
            return Some(InteractionOutcome::DoubleClick(target));
        }

        match target {
            HitTarget::Handle(node_id, side) => {
                let node = graph.node(&node_id)?;
                let start = WorldPoint(geometry::handle_position(node, side));
                self.gesture = Gesture::Connecting {
                    source: node_id,
                    start,
                    endpoint: start,
                };
            }
            HitTarget::Node(node_id) => {
                let node = graph.node(&node_id)?;
                let node_screen = self.viewport.to_screen(WorldPoint(node.position));
                self.gesture = Gesture::DraggingNode {
                    node: node_id,
                    grab_offset: position - node_screen,
                };
            }
            HitTarget::Canvas if self.pan_key_held() => {
                self.gesture = Gesture::Panning {
                    origin: position,
                    origin_offset: self.viewport.offset(),
                };
            }
            HitTarget::Edge(_) | HitTarget::Canvas => {}
        }
        None
    }

    fn pointer_move(&mut self, graph: &mut Graph, position: ScreenPoint) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::DraggingNode { node, grab_offset } => {
                let world = self.viewport.to_world(position - *grab_offset);
                if !graph.move_node(node, world.0) {
                    log::debug!("Dragged node {} no longer exists", node);
                    self.gesture = Gesture::Idle;
                }
            }
            Gesture::Connecting { endpoint, .. } => {
                *endpoint = self.viewport.to_world(position);
            }
            Gesture::Panning {
                origin,
                origin_offset,
            } => {
                // Sum of all pointer deltas since the pan started.
                self.viewport.set_offset(*origin_offset + (position - *origin));
            }
        }
    }

    fn pointer_up(
        &mut self,
        graph: &mut Graph,
        position: ScreenPoint,
        button: MouseButton,
    ) -> Option<InteractionOutcome> {
        if button != MouseButton::Left {
            return None;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::DraggingNode { node, .. } => Some(InteractionOutcome::NodeDropped(node)),
            Gesture::Connecting { source, .. } => {
                let target = self.hit_test(graph, position);
                let outcome = match target.node() {
                    Some(target) => match graph.connect(&source, target) {
                        Some(edge) => InteractionOutcome::Connected(edge.id().clone()),
                        None => InteractionOutcome::ConnectionRejected,
                    },
                    None => InteractionOutcome::ConnectionDiscarded,
                };
                Some(outcome)
            }
            Gesture::Panning { .. } => Some(InteractionOutcome::PanFinished),
        }
    }
}
