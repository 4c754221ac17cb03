//! Node and edge data types.

use crate::score::ScoreAttributes;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a node. Generated ids are UUIDs; imported ids keep the text they had.
    NodeId
);
string_id!(
    /// Identifier of an edge.
    EdgeId
);
string_id!(
    /// Identifier of a persisted diagram.
    DiagramId
);

/// The shape family of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Start/end pill.
    #[serde(alias = "start")]
    Terminal,
    /// Plain process box.
    #[default]
    Process,
    /// Decision diamond.
    Decision,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 3] = [NodeKind::Terminal, NodeKind::Process, NodeKind::Decision];

    /// Label given to freshly placed nodes.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Terminal => "Start",
            NodeKind::Process => "Process",
            NodeKind::Decision => "Decision?",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Terminal => "terminal",
            NodeKind::Process => "process",
            NodeKind::Decision => "decision",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" | "start" | "end" => Ok(NodeKind::Terminal),
            "process" => Ok(NodeKind::Process),
            "decision" => Ok(NodeKind::Decision),
            other => Err(format!("unknown node kind: {}", other)),
        }
    }
}

/// A flowchart node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Shape family.
    pub kind: NodeKind,
    /// Top-left corner of the bounding box, in world coordinates.
    pub position: Point,
    /// Display text.
    pub label: String,
    /// Decision-scoring attributes, present only while score mode is on for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreAttributes>,
}

impl Node {
    /// Create a node with a generated id and the kind's default label.
    pub fn new(kind: NodeKind, position: Point) -> Self {
        Self::with_id(NodeId::generate(), kind, position, kind.default_label())
    }

    /// Create a node with an explicit id (used by import and storage).
    pub fn with_id(
        id: NodeId,
        kind: NodeKind,
        position: Point,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            label: label.into(),
            score: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Current derived score, if scoring is enabled for this node.
    pub fn score_value(&self) -> Option<f64> {
        self.score.as_ref().map(ScoreAttributes::score)
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    /// Create an unlabeled edge with a generated id.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId::generate(),
            source,
            target,
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    /// Whether this edge touches the given node on either end.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// Label text, treating an empty string as no label.
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }
}
