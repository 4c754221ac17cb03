//! FlowSketch Core Library
//!
//! Platform-agnostic core of the FlowSketch flowchart editor: the graph store,
//! the text notation codec, pointer interaction and diagram persistence.

pub mod config;
pub mod diagram;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod interaction;
pub mod model;
pub mod notation;
pub mod scene;
pub mod score;
pub mod session;
pub mod storage;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use diagram::Diagram;
pub use geometry::{HandleSide, anchor_of};
pub use graph::Graph;
pub use input::{InputState, KeyEvent, MouseButton, PointerEvent};
pub use interaction::{Gesture, HitTarget, InteractionController, InteractionOutcome};
pub use model::{DiagramId, Edge, EdgeId, Node, NodeId, NodeKind};
pub use notation::{ImportLayout, ParseReport};
pub use scene::Scene;
pub use score::{Irreversibility, KnowledgeFactor, ScoreAttributes, ScorePatch};
pub use session::{ContextMenu, ContextTarget, Editor, ImportError, LabelEdit, MenuAction};
pub use storage::{DiagramGateway, DiagramMeta, DiagramRecord, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use viewport::{ScreenPoint, Viewport, WorldPoint};
