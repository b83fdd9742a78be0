//! The editable stage graph as it arrives from the UI.
//!
//! The graph is adversarial input: mid-edit it may branch, cycle, or fall
//! apart into islands. It is therefore stored as flat, id-addressed
//! collections and re-validated on every compile; nothing here enforces
//! chain shape. Every mutation bumps a revision counter so the session
//! layer can tell when the derived pipeline is stale.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{StageConfig, StageType};

/// Node identifier. Plain strings on the wire so the UI may supply its own.
pub type NodeId = String;

/// Canvas coordinates. Layout only, irrelevant to compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One stage on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub stage_type: StageType,
    #[serde(default)]
    pub config: StageConfig,
    #[serde(default)]
    pub position: Position,
    /// Short message when the node's last compile or execution failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Node {
    /// Create a node with a fresh id and the stage type's default config.
    pub fn new(stage_type: StageType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stage_type,
            config: stage_type.default_config(),
            position: Position::default(),
            error: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }
}

/// A directed connection between two stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Adjacent node ids for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors {
    pub incoming: Vec<NodeId>,
    pub outgoing: Vec<NodeId>,
}

/// Flat node/edge collections with structural operations only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    revision: u64,
}

impl StageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped by every mutation. The derived pipeline is
    /// stale whenever this differs from the revision it was compiled at.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Insert a node, replacing any existing node with the same id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.id == node.id) {
            *existing = node;
        } else {
            self.nodes.push(node);
        }
        self.revision += 1;
        id
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        self.revision += 1;
        true
    }

    /// Connect two nodes. Duplicate edges are ignored; endpoints are not
    /// checked for existence and degree limits are not enforced here.
    pub fn add_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        let edge = Edge::new(source, target);
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
            self.revision += 1;
        }
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        if self.edges.len() == before {
            return false;
        }
        self.revision += 1;
        true
    }

    /// Replace a node's configuration and clear its stored error.
    pub fn set_config(&mut self, id: &str, config: StageConfig) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.config = config;
                node.error = None;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Flag or clear a node's error message. Does not touch the revision:
    /// attribution is presentation state, not graph structure.
    pub fn set_error(&mut self, id: &str, error: Option<String>) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.error = error;
                true
            }
            None => false,
        }
    }

    pub fn neighbors(&self, id: &str) -> Neighbors {
        let mut neighbors = Neighbors::default();
        for edge in &self.edges {
            if edge.source == id {
                neighbors.outgoing.push(edge.target.clone());
            }
            if edge.target == id {
                neighbors.incoming.push(edge.source.clone());
            }
        }
        neighbors
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.target == id).count()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.source == id).count()
    }

    /// The single outgoing neighbor, if any.
    pub fn successor(&self, id: &str) -> Option<&NodeId> {
        self.edges.iter().find(|e| e.source == id).map(|e| &e.target)
    }
}
