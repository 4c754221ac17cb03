//! Application state for one editing session.
//!
//! [`Editor`] owns the open diagram, the interaction controller, transient UI
//! state (context menu, inline label edit, properties panel) and the gateway.
//! A front end forwards raw events here and draws [`Editor::scene`].

use crate::config::EditorConfig;
use crate::diagram::Diagram;
use crate::graph::Graph;
use crate::input::{KeyEvent, PointerEvent};
use crate::interaction::{HitTarget, InteractionController, InteractionOutcome};
use crate::model::{DiagramId, EdgeId, NodeId, NodeKind};
use crate::notation::{self, ParseReport};
use crate::scene::Scene;
use crate::score::ScorePatch;
use crate::storage::{DiagramGateway, DiagramMeta, KeyValueStore, StorageResult};
use crate::viewport::ScreenPoint;
use thiserror::Error;

/// Errors surfaced by notation import.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Input contains no recognizable nodes or edges")]
    Empty,
}

/// What a context menu was opened on.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextTarget {
    Node(NodeId),
    Edge(EdgeId),
}

/// Actions offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Duplicate,
    Delete,
    Properties,
    EditLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub position: ScreenPoint,
    pub target: ContextTarget,
}

impl ContextMenu {
    /// Actions valid for the menu's target.
    pub fn actions(&self) -> &'static [MenuAction] {
        match self.target {
            ContextTarget::Node(_) => &[MenuAction::Duplicate, MenuAction::Delete, MenuAction::Properties],
            ContextTarget::Edge(_) => &[MenuAction::EditLabel, MenuAction::Delete],
        }
    }
}

/// An inline label edit in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEdit {
    pub target: ContextTarget,
    pub draft: String,
}

/// One editing session over a key-value store.
pub struct Editor<S: KeyValueStore> {
    config: EditorConfig,
    diagram: Diagram,
    controller: InteractionController,
    context_menu: Option<ContextMenu>,
    label_edit: Option<LabelEdit>,
    properties: Option<NodeId>,
    gateway: DiagramGateway<S>,
}

impl<S: KeyValueStore> Editor<S> {
    pub fn new(config: EditorConfig, gateway: DiagramGateway<S>) -> Self {
        let controller = InteractionController::from_config(&config);
        let mut editor = Self {
            config,
            diagram: Diagram::new(),
            controller,
            context_menu: None,
            label_edit: None,
            properties: None,
            gateway,
        };
        editor.apply_config_to_graph();
        editor
    }

    fn apply_config_to_graph(&mut self) {
        self.diagram.graph.set_score_new_nodes(self.config.score_new_nodes);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn graph(&self) -> &Graph {
        &self.diagram.graph
    }

    /// Direct store access for front ends that bypass the pointer.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.diagram.graph
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn gateway(&self) -> &DiagramGateway<S> {
        &self.gateway
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn label_edit(&self) -> Option<&LabelEdit> {
        self.label_edit.as_ref()
    }

    /// Node whose properties panel is open.
    pub fn properties(&self) -> Option<&NodeId> {
        self.properties.as_ref()
    }

    pub fn scene(&self) -> Scene {
        Scene::build(&self.diagram.graph, &self.controller)
    }

    /// Drop every piece of transient state tied to the current diagram.
    fn reset_transient(&mut self) {
        self.controller.cancel();
        self.context_menu = None;
        self.label_edit = None;
        self.properties = None;
    }

    // --- Shapes ---

    /// Add a node at a screen point (e.g. the toolbar drop position).
    pub fn add_node(&mut self, kind: NodeKind, at: ScreenPoint) -> NodeId {
        let world = self.controller.viewport().to_world(at);
        self.diagram.graph.add_node(kind, world.0).id().clone()
    }

    // --- Events ---

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> Option<InteractionOutcome> {
        if matches!(event, PointerEvent::Down { .. }) {
            self.context_menu = None;
            self.commit_label_edit();
        }
        let outcome = self
            .controller
            .handle_pointer_event(&mut self.diagram.graph, event);
        if let Some(InteractionOutcome::DoubleClick(target)) = &outcome {
            match target {
                HitTarget::Node(id) | HitTarget::Handle(id, _) => {
                    self.begin_label_edit(ContextTarget::Node(id.clone()));
                }
                HitTarget::Edge(id) => {
                    self.begin_label_edit(ContextTarget::Edge(id.clone()));
                }
                HitTarget::Canvas => {}
            }
        }
        outcome
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Option<InteractionOutcome> {
        self.controller.handle_key_event(event)
    }

    pub fn window_resized(&mut self) {
        self.controller.cancel();
        self.context_menu = None;
    }

    pub fn focus_lost(&mut self) {
        self.controller.reset_input();
        self.context_menu = None;
    }

    // --- Context menu ---

    /// Open the context menu for whatever is under `position`.
    ///
    /// Any running gesture is cancelled. Returns `false` on empty canvas.
    pub fn open_context_menu(&mut self, position: ScreenPoint) -> bool {
        self.controller.cancel();
        let target = match self.controller.hit_test(&self.diagram.graph, position) {
            HitTarget::Node(id) | HitTarget::Handle(id, _) => ContextTarget::Node(id),
            HitTarget::Edge(id) => ContextTarget::Edge(id),
            HitTarget::Canvas => {
                self.context_menu = None;
                return false;
            }
        };
        self.context_menu = Some(ContextMenu { position, target });
        true
    }

    pub fn dismiss_context_menu(&mut self) {
        self.context_menu = None;
        self.controller.cancel();
    }

    /// Run a menu action and close the menu. Returns `false` if the action does not apply.
    pub fn apply_menu_action(&mut self, action: MenuAction) -> bool {
        let Some(menu) = self.context_menu.take() else {
            return false;
        };
        if !menu.actions().contains(&action) {
            log::debug!("Menu action {:?} does not apply to {:?}", action, menu.target);
            return false;
        }
        if action == MenuAction::EditLabel {
            return self.begin_label_edit(menu.target);
        }
        let graph = &mut self.diagram.graph;
        match (action, menu.target) {
            (MenuAction::Duplicate, ContextTarget::Node(id)) => graph
                .duplicate_node_with_offset(&id, self.config.duplicate_offset)
                .is_some(),
            (MenuAction::Delete, ContextTarget::Node(id)) => {
                if self.properties.as_ref() == Some(&id) {
                    self.properties = None;
                }
                graph.delete_node(&id).is_some()
            }
            (MenuAction::Delete, ContextTarget::Edge(id)) => graph.delete_edge(&id).is_some(),
            (MenuAction::Properties, ContextTarget::Node(id)) => {
                let exists = graph.contains_node(&id);
                if exists {
                    self.properties = Some(id);
                }
                exists
            }
            _ => false,
        }
    }

    // --- Inline label editing ---

    /// Start editing a label, seeded with its current text.
    pub fn begin_label_edit(&mut self, target: ContextTarget) -> bool {
        let graph = &self.diagram.graph;
        let current = match &target {
            ContextTarget::Node(id) => graph.node(id).map(|n| n.label.clone()),
            ContextTarget::Edge(id) => graph.edge(id).map(|e| e.label.clone().unwrap_or_default()),
        };
        match current {
            Some(draft) => {
                self.label_edit = Some(LabelEdit { target, draft });
                true
            }
            None => false,
        }
    }

    pub fn set_label_draft(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.label_edit {
            edit.draft = text.into();
        }
    }

    /// Write the draft back through the store.
    pub fn commit_label_edit(&mut self) -> bool {
        let Some(edit) = self.label_edit.take() else {
            return false;
        };
        match edit.target {
            ContextTarget::Node(id) => self.diagram.graph.relabel_node(&id, edit.draft),
            ContextTarget::Edge(id) => self.diagram.graph.relabel_edge(&id, edit.draft),
        }
    }

    pub fn cancel_label_edit(&mut self) {
        self.label_edit = None;
    }

    // --- Properties ---

    pub fn apply_properties(&mut self, patch: ScorePatch) -> bool {
        match &self.properties {
            Some(id) => self.diagram.graph.update_score_attributes(id, patch),
            None => false,
        }
    }

    pub fn set_score_mode(&mut self, enabled: bool) -> bool {
        match &self.properties {
            Some(id) => self.diagram.graph.set_score_mode(id, enabled),
            None => false,
        }
    }

    pub fn close_properties(&mut self) {
        self.properties = None;
    }

    // --- Notation ---

    pub fn export_notation(&self) -> String {
        notation::generate(&self.diagram.graph)
    }

    /// Replace the graph with parsed notation.
    ///
    /// Non-empty text that yields nothing is an error and leaves the graph untouched.
    /// Empty text clears the graph.
    pub fn import_notation(&mut self, text: &str) -> Result<ParseReport, ImportError> {
        let parsed = notation::parse_with_layout(text, self.config.import_layout());
        if parsed.report.is_empty() && !text.trim().is_empty() {
            log::warn!("Import produced no nodes or edges");
            return Err(ImportError::Empty);
        }
        self.reset_transient();
        self.diagram.graph = parsed.graph;
        self.apply_config_to_graph();
        log::info!(
            "Imported {} nodes and {} edges",
            parsed.report.nodes,
            parsed.report.edges
        );
        Ok(parsed.report)
    }

    // --- Diagrams ---

    /// Start a fresh, unsaved diagram.
    pub fn new_diagram(&mut self) {
        self.reset_transient();
        self.controller.viewport_mut().reset();
        self.diagram = Diagram::new();
        self.apply_config_to_graph();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.diagram.name = name.into();
    }

    pub fn save(&mut self) -> StorageResult<()> {
        let diagram = &self.diagram;
        let record = self.gateway.save(
            &diagram.id,
            &diagram.name,
            diagram.graph.nodes(),
            diagram.graph.edges(),
        )?;
        self.diagram.last_modified = Some(record.last_modified);
        Ok(())
    }

    pub fn saved_diagrams(&self) -> Vec<DiagramMeta> {
        self.gateway.list()
    }

    /// Open a saved diagram. On failure a fresh diagram is opened instead and `false` returned.
    pub fn load_diagram(&mut self, id: &DiagramId) -> bool {
        match self.gateway.load(id) {
            Some(record) => {
                self.reset_transient();
                self.controller.viewport_mut().reset();
                self.diagram = Diagram::from_record(record);
                self.apply_config_to_graph();
                true
            }
            None => {
                log::warn!("Could not open diagram {}, starting a new one", id);
                self.new_diagram();
                false
            }
        }
    }

    /// Delete a saved diagram. Deleting the open one starts a new diagram.
    pub fn delete_diagram(&mut self, id: &DiagramId) -> StorageResult<()> {
        self.gateway.delete(id)?;
        if &self.diagram.id == id {
            self.new_diagram();
        }
        Ok(())
    }

    /// Open the most recently modified diagram, or a fresh one if there is none.
    pub fn restore(&mut self) -> bool {
        match self.gateway.list().first() {
            Some(meta) => {
                let id = meta.id.clone();
                self.load_diagram(&id)
            }
            None => {
                self.new_diagram();
                false
            }
        }
    }
}
