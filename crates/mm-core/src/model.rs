//! Core diagram data model for Mind Mapper documents.
//!
//! A diagram is a flat list of nodes plus a flat list of directed edges,
//! exactly the shape the interactive canvas consumes and the JSON file
//! format stores. Mutation primitives keep two invariants:
//!
//! - node ids are unique and positions finite;
//! - every edge references existing nodes, edge ids are unique and no
//!   `(source, target)` pair appears twice. Deleting a node cascades to its
//!   edges.

use crate::error::{Error, Result};
use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Canvas renderer tag stored on every node (`Node::renderer`).
pub const NODE_RENDERER: &str = "custom";

/// Name given to documents that were never named.
pub const UNTITLED: &str = "Untitled Mind Map";

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let nibbles = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()?;

        let channels: Vec<u8> = match nibbles.len() {
            3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
            6 | 8 => nibbles.chunks(2).map(|p| p[0] << 4 | p[1]).collect(),
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            f32::from(channels[0]) / 255.0,
            f32::from(channels[1]) / 255.0,
            f32::from(channels[2]) / 255.0,
            f32::from(alpha) / 255.0,
        ))
    }

    /// Emit the shortest hex form: `#RGB`/`#RGBA` when every channel byte
    /// is a doubled nibble, otherwise `#RRGGBB`/`#RRGGBBAA`. Alpha is only
    /// written when the color is not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let rgba = [byte(self.r), byte(self.g), byte(self.b), byte(self.a)];
        let channels = if rgba[3] == 255 { &rgba[..3] } else { &rgba[..] };

        let mut hex = String::with_capacity(1 + 2 * channels.len());
        hex.push('#');
        if channels.iter().all(|c| c % 17 == 0) {
            for c in channels {
                let _ = write!(hex, "{:X}", c / 17);
            }
        } else {
            for c in channels {
                let _ = write!(hex, "{c:02X}");
            }
        }
        hex
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ─── Node categories ─────────────────────────────────────────────────────

/// Visual category of a node (`data.type`). Unknown tags read as `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    #[default]
    Default,
    Primary,
    Secondary,
    Success,
    Warning,
    Info,
    Danger,
}

impl NodeKind {
    /// Palette cycled through by depth when generating diagrams.
    pub const PALETTE: [NodeKind; 6] = [
        NodeKind::Primary,
        NodeKind::Secondary,
        NodeKind::Success,
        NodeKind::Warning,
        NodeKind::Info,
        NodeKind::Danger,
    ];

    pub fn for_level(level: usize) -> Self {
        Self::PALETTE[level % Self::PALETTE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Default => "default",
            NodeKind::Primary => "primary",
            NodeKind::Secondary => "secondary",
            NodeKind::Success => "success",
            NodeKind::Warning => "warning",
            NodeKind::Info => "info",
            NodeKind::Danger => "danger",
        }
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "primary" => NodeKind::Primary,
            "secondary" => NodeKind::Secondary,
            "success" => NodeKind::Success,
            "warning" => NodeKind::Warning,
            "info" => NodeKind::Info,
            "danger" => NodeKind::Danger,
            _ => NodeKind::Default,
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

/// Label size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

// ─── Node ────────────────────────────────────────────────────────────────

/// The user-editable payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl NodeData {
    /// Data with just a label; every style attribute left to the renderer.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Default,
            color: None,
            text_color: None,
            font_size: None,
            width: None,
            height: None,
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Merge the present fields of `patch` into `self`.
    pub fn merge(&mut self, patch: &NodeDataPatch) {
        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if patch.color.is_some() {
            self.color = patch.color;
        }
        if patch.text_color.is_some() {
            self.text_color = patch.text_color;
        }
        if patch.font_size.is_some() {
            self.font_size = patch.font_size;
        }
        if patch.width.is_some() {
            self.width = patch.width;
        }
        if patch.height.is_some() {
            self.height = patch.height;
        }
    }
}

/// Partial update for [`NodeData`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NodeKind>,
    pub color: Option<Color>,
    pub text_color: Option<Color>,
    pub font_size: Option<FontSize>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl NodeDataPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Renderer tag for the canvas collaborator; not interpreted here.
    #[serde(rename = "type", default = "default_renderer")]
    pub renderer: String,
    pub position: Position,
    pub data: NodeData,
}

fn default_renderer() -> String {
    NODE_RENDERER.to_string()
}

impl Node {
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self {
            id,
            renderer: default_renderer(),
            position,
            data,
        }
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────

/// How the canvas draws an edge path. Unknown tags read as `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Default,
    Straight,
    Step,
    SmoothStep,
    SimpleBezier,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Default => "default",
            EdgeKind::Straight => "straight",
            EdgeKind::Step => "step",
            EdgeKind::SmoothStep => "smoothstep",
            EdgeKind::SimpleBezier => "simplebezier",
        }
    }
}

impl FromStr for EdgeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "straight" => EdgeKind::Straight,
            "step" => EdgeKind::Step,
            "smoothstep" => EdgeKind::SmoothStep,
            "simplebezier" => EdgeKind::SimpleBezier,
            _ => EdgeKind::Default,
        })
    }
}

impl Serialize for EdgeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

/// A directed connection `source -> target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
}

impl Edge {
    /// The editor's edge between two nodes: derived id, smooth-step path.
    pub fn between(source: NodeId, target: NodeId) -> Self {
        Self {
            id: NodeId::edge(source, target),
            source,
            target,
            kind: EdgeKind::SmoothStep,
        }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// An immutable copy of a diagram's nodes and edges (one history entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

// ─── Diagram ─────────────────────────────────────────────────────────────

/// The node/edge graph being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub name: String,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(UNTITLED)
    }
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            name: name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn has_edge_between(&self, source: NodeId, target: NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Edges whose source or target is `id`.
    pub fn edges_touching(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Create a node of `kind` at `position`. When `parent` is given, the
    /// edge `parent -> new` is created as well.
    ///
    /// Fails with `NotFound` for an unknown parent and `Validation` for a
    /// non-finite position; in both cases nothing is created.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        position: Position,
        data: NodeData,
    ) -> Result<NodeId> {
        if !position.is_finite() {
            return Err(Error::Validation(format!(
                "node position ({}, {}) is not finite",
                position.x, position.y
            )));
        }
        if let Some(parent_id) = parent {
            if !self.contains_node(parent_id) {
                return Err(Error::NotFound(parent_id));
            }
        }

        let id = NodeId::fresh();
        self.nodes.push(Node::new(id, position, data.with_kind(kind)));
        if let Some(parent_id) = parent {
            let edge = self.unused_edge(parent_id, id);
            self.edges.push(edge);
        }
        log::debug!("added node {id} (parent: {parent:?})");
        Ok(id)
    }

    /// Merge `patch` into the node's data.
    pub fn update_node(&mut self, id: NodeId, patch: &NodeDataPatch) -> Result<()> {
        let node = self.node_mut(id).ok_or(Error::NotFound(id))?;
        node.data.merge(patch);
        Ok(())
    }

    /// Move a node to an absolute position.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::Validation(format!(
                "node position ({}, {}) is not finite",
                position.x, position.y
            )));
        }
        let node = self.node_mut(id).ok_or(Error::NotFound(id))?;
        node.position = position;
        Ok(())
    }

    /// Remove a node and every edge touching it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node> {
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(Error::NotFound(id))?;
        let node = self.nodes.remove(idx);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        log::debug!(
            "deleted node {id} and {} edge(s)",
            before - self.edges.len()
        );
        Ok(node)
    }

    /// Connect `source -> target`. Returns `Ok(None)` when that pair is
    /// already connected (duplicates are never created).
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<Option<EdgeId>> {
        for endpoint in [source, target] {
            if !self.contains_node(endpoint) {
                return Err(Error::NotFound(endpoint));
            }
        }
        if self.has_edge_between(source, target) {
            return Ok(None);
        }
        let edge = self.unused_edge(source, target);
        let id = edge.id;
        self.edges.push(edge);
        Ok(Some(id))
    }

    /// [`Edge::between`] with an id no other edge uses. Node ids may contain
    /// `-`, so two different pairs can derive the same `e{source}-{target}`
    /// id; a numeric suffix keeps it unique.
    fn unused_edge(&self, source: NodeId, target: NodeId) -> Edge {
        let mut edge = Edge::between(source, target);
        let base = edge.id;
        let mut suffix = 1usize;
        while self.edge(edge.id).is_some() {
            edge.id = NodeId::intern(&format!("{}-{suffix}", base.as_str()));
            suffix += 1;
        }
        edge
    }

    /// Remove a single edge by id.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let idx = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::NotFound(id))?;
        Ok(self.edges.remove(idx))
    }

    /// Deep copy of the current nodes and edges.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Replace nodes and edges wholesale; the name is kept.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
    }

    /// Whether the current nodes and edges equal `snapshot`.
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        self.nodes == snapshot.nodes && self.edges == snapshot.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diagram_with(labels: &[&str]) -> (Diagram, Vec<NodeId>) {
        let mut diagram = Diagram::default();
        let ids = labels
            .iter()
            .map(|label| {
                diagram
                    .add_node(
                        NodeKind::Default,
                        None,
                        Position::ORIGIN,
                        NodeData::labeled(*label),
                    )
                    .unwrap()
            })
            .collect();
        (diagram, ids)
    }

    #[test]
    fn add_node_with_parent_creates_edge() {
        let (mut diagram, ids) = diagram_with(&["root"]);
        let child = diagram
            .add_node(
                NodeKind::Secondary,
                Some(ids[0]),
                Position::new(10.0, 20.0),
                NodeData::labeled("child"),
            )
            .unwrap();

        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.node(child).unwrap().data.kind, NodeKind::Secondary);
        assert_eq!(diagram.edges.len(), 1);
        let edge = &diagram.edges[0];
        assert_eq!((edge.source, edge.target), (ids[0], child));
        assert_eq!(edge.kind, EdgeKind::SmoothStep);
    }

    #[test]
    fn add_node_with_unknown_parent_is_not_found() {
        let (mut diagram, _) = diagram_with(&["root"]);
        let ghost = NodeId::intern("ghost");
        let err = diagram
            .add_node(
                NodeKind::Default,
                Some(ghost),
                Position::ORIGIN,
                NodeData::labeled("orphan"),
            )
            .unwrap_err();
        assert_eq!(err, Error::NotFound(ghost));
        assert_eq!(diagram.nodes.len(), 1);
        assert!(diagram.edges.is_empty());
    }

    #[test]
    fn add_node_rejects_non_finite_position() {
        let mut diagram = Diagram::default();
        let result = diagram.add_node(
            NodeKind::Default,
            None,
            Position::new(f64::NAN, 0.0),
            NodeData::labeled("bad"),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(diagram.nodes.is_empty());
    }

    #[test]
    fn update_node_merges_partial_data() {
        let (mut diagram, ids) = diagram_with(&["idea"]);
        diagram
            .update_node(ids[0], &NodeDataPatch::color(Color::BLACK))
            .unwrap();
        diagram
            .update_node(ids[0], &NodeDataPatch::label("better idea"))
            .unwrap();

        let data = &diagram.node(ids[0]).unwrap().data;
        assert_eq!(data.label, "better idea");
        assert_eq!(data.color, Some(Color::BLACK));
    }

    #[test]
    fn update_unknown_node_is_not_found() {
        let mut diagram = Diagram::default();
        let id = NodeId::intern("missing");
        assert_eq!(
            diagram.update_node(id, &NodeDataPatch::label("x")),
            Err(Error::NotFound(id))
        );
    }

    #[test]
    fn delete_node_cascades_edges() {
        let (mut diagram, ids) = diagram_with(&["a", "b", "c"]);
        diagram.add_edge(ids[0], ids[1]).unwrap();
        diagram.add_edge(ids[1], ids[2]).unwrap();
        diagram.add_edge(ids[0], ids[2]).unwrap();

        diagram.delete_node(ids[1]).unwrap();

        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.edges.len(), 1);
        assert!(diagram.edges_touching(ids[1]).next().is_none());
    }

    #[test]
    fn add_edge_is_idempotent() {
        let (mut diagram, ids) = diagram_with(&["a", "b"]);
        let first = diagram.add_edge(ids[0], ids[1]).unwrap();
        let second = diagram.add_edge(ids[0], ids[1]).unwrap();

        assert_eq!(first, Some(NodeId::edge(ids[0], ids[1])));
        assert_eq!(second, None);
        assert_eq!(diagram.edges.len(), 1);
    }

    #[test]
    fn reverse_edge_is_a_distinct_pair() {
        let (mut diagram, ids) = diagram_with(&["a", "b"]);
        diagram.add_edge(ids[0], ids[1]).unwrap();
        diagram.add_edge(ids[1], ids[0]).unwrap();
        assert_eq!(diagram.edges.len(), 2);
    }

    #[test]
    fn add_edge_to_missing_node_is_not_found() {
        let (mut diagram, ids) = diagram_with(&["a"]);
        let ghost = NodeId::intern("ghost_target");
        assert_eq!(diagram.add_edge(ids[0], ghost), Err(Error::NotFound(ghost)));
    }

    #[test]
    fn snapshot_restore_keeps_name() {
        let (mut diagram, ids) = diagram_with(&["a"]);
        diagram.name = "Plans".into();
        let snap = diagram.snapshot();
        diagram.delete_node(ids[0]).unwrap();
        assert!(!diagram.matches(&snap));

        diagram.restore(snap.clone());
        assert!(diagram.matches(&snap));
        assert_eq!(diagram.name, "Plans");
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6366F1").unwrap();
        assert_eq!(c.to_hex(), "#6366F1");

        let short = Color::from_hex("#fff").unwrap();
        assert_eq!(short, Color::WHITE);

        let translucent = Color::from_hex("00000080").unwrap();
        assert_eq!(translucent.to_hex(), "#00000080");

        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#zzz").is_none());
    }

    #[test]
    fn color_hex_uses_shortest_form() {
        assert_eq!(Color::WHITE.to_hex(), "#FFF");
        assert_eq!(Color::from_hex("#ffffff").unwrap().to_hex(), "#FFF");
        assert_eq!(Color::from_hex("#11223344").unwrap().to_hex(), "#1234");
        assert_eq!(Color::from_hex("#ffffff80").unwrap().to_hex(), "#FFFFFF80");

        for hex in ["#F0A", "#F0A8", "#6366F1", "#00000080"] {
            let color = Color::from_hex(hex).unwrap();
            assert_eq!(color.to_hex(), hex);
            assert_eq!(Color::from_hex(&color.to_hex()), Some(color));
        }
    }

    #[test]
    fn derived_edge_id_collision_gets_unique_id() {
        let mut diagram = Diagram::default();
        let [a, a_b, b_c, c] = ["a", "a-b", "b-c", "c"].map(NodeId::intern);
        for id in [a, a_b, b_c, c] {
            diagram
                .nodes
                .push(Node::new(id, Position::ORIGIN, NodeData::labeled(id.as_str())));
        }
        // `a-b -> c` derives the same id as `a -> b-c`.
        diagram.edges.push(Edge::between(a_b, c));
        assert_eq!(diagram.edges[0].id.as_str(), "ea-b-c");

        let added = diagram.add_edge(a, b_c).unwrap().unwrap();
        assert_ne!(added, diagram.edges[0].id);
        assert_eq!(added.as_str(), "ea-b-c-1");
        assert_eq!(diagram.edge(added).unwrap().source, a);

        let child = diagram
            .add_node(NodeKind::Default, Some(a), Position::ORIGIN, NodeData::labeled("d"))
            .unwrap();
        let ids: Vec<_> = diagram.edges.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| ids.iter().filter(|x| *x == id).count() == 1));
        assert!(diagram.has_edge_between(a, child));
    }

    #[test]
    fn unknown_kinds_read_as_default() {
        let data: NodeData =
            serde_json::from_str(r#"{"label":"x","type":"mystery"}"#).unwrap();
        assert_eq!(data.kind, NodeKind::Default);

        let edge: Edge =
            serde_json::from_str(r#"{"id":"e1","source":"a","target":"b","type":"fancy"}"#)
                .unwrap();
        assert_eq!(edge.kind, EdgeKind::Default);
    }

    #[test]
    fn palette_cycles_by_level() {
        assert_eq!(NodeKind::for_level(0), NodeKind::Primary);
        assert_eq!(NodeKind::for_level(5), NodeKind::Danger);
        assert_eq!(NodeKind::for_level(6), NodeKind::Primary);
    }
}
