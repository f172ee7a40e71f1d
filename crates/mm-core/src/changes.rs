//! Reducers for change records emitted by the interactive canvas.
//!
//! The canvas reports what the user did (moved, resized, selected, removed)
//! as batches of small deltas. Applying them is purely mechanical; the
//! returned [`ChangeEffects`] tells the owner what happened so it can decide
//! about selection and history.

use crate::id::{EdgeId, NodeId};
use crate::model::{Diagram, Edge, Node, Position};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single node delta from the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    Add {
        item: Node,
    },
    /// `dragging: true` while the pointer is down; the final change of a
    /// drag carries `dragging: false`.
    Position {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: bool,
    },
    Dimensions {
        id: NodeId,
        width: f64,
        height: f64,
    },
    Select {
        id: NodeId,
        selected: bool,
    },
    Remove {
        id: NodeId,
    },
}

/// A single edge delta from the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Add { item: Edge },
    Remove { id: EdgeId },
}

/// What a batch of changes did to the diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeEffects {
    /// Nodes or edges were added or removed.
    pub structural: bool,
    /// A drag finished (a position change with `dragging: false`).
    pub drag_ended: bool,
    /// Last selection toggle in the batch: `(node, selected)`.
    pub selection: Option<(NodeId, bool)>,
    /// Nodes removed by this batch.
    pub removed: SmallVec<[NodeId; 4]>,
}

impl ChangeEffects {
    /// Whether this batch is a discrete user action worth a history entry.
    pub fn is_undo_worthy(&self) -> bool {
        self.structural || self.drag_ended
    }
}

impl Diagram {
    /// Apply a batch of node changes. Changes referring to unknown ids are
    /// skipped, as are additions that would duplicate an id or place a node
    /// at a non-finite position.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> ChangeEffects {
        let mut effects = ChangeEffects::default();
        for change in changes {
            match change {
                NodeChange::Add { item } => {
                    if self.contains_node(item.id) || !item.position.is_finite() {
                        log::debug!("skipping node add for {}", item.id);
                        continue;
                    }
                    self.nodes.push(item.clone());
                    effects.structural = true;
                }
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    let Some(node) = self.node_mut(*id) else {
                        continue;
                    };
                    if let Some(pos) = position.filter(Position::is_finite) {
                        node.position = pos;
                    }
                    if !dragging {
                        effects.drag_ended = true;
                    }
                }
                NodeChange::Dimensions { id, width, height } => {
                    if let Some(node) = self.node_mut(*id) {
                        node.data.width = Some(*width);
                        node.data.height = Some(*height);
                    }
                }
                NodeChange::Select { id, selected } => {
                    if self.contains_node(*id) {
                        effects.selection = Some((*id, *selected));
                    }
                }
                NodeChange::Remove { id } => {
                    if self.delete_node(*id).is_ok() {
                        effects.structural = true;
                        effects.removed.push(*id);
                    }
                }
            }
        }
        effects
    }

    /// Apply a batch of edge changes. Additions that would dangle or
    /// duplicate an existing `(source, target)` pair are skipped.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> ChangeEffects {
        let mut effects = ChangeEffects::default();
        for change in changes {
            match change {
                EdgeChange::Add { item } => {
                    let dangling =
                        !self.contains_node(item.source) || !self.contains_node(item.target);
                    if dangling
                        || self.edge(item.id).is_some()
                        || self.has_edge_between(item.source, item.target)
                    {
                        log::debug!("skipping edge add for {}", item.id);
                        continue;
                    }
                    self.edges.push(item.clone());
                    effects.structural = true;
                }
                EdgeChange::Remove { id } => {
                    if self.remove_edge(*id).is_ok() {
                        effects.structural = true;
                    }
                }
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, NodeKind};

    fn two_connected() -> (Diagram, NodeId, NodeId) {
        let mut diagram = Diagram::default();
        let a = diagram
            .add_node(NodeKind::Primary, None, Position::ORIGIN, NodeData::labeled("a"))
            .unwrap();
        let b = diagram
            .add_node(
                NodeKind::Default,
                Some(a),
                Position::new(100.0, 0.0),
                NodeData::labeled("b"),
            )
            .unwrap();
        (diagram, a, b)
    }

    #[test]
    fn dragging_moves_without_being_undo_worthy() {
        let (mut diagram, a, _) = two_connected();
        let effects = diagram.apply_node_changes(&[NodeChange::Position {
            id: a,
            position: Some(Position::new(5.0, 6.0)),
            dragging: true,
        }]);
        assert_eq!(diagram.node(a).unwrap().position, Position::new(5.0, 6.0));
        assert!(!effects.is_undo_worthy());
    }

    #[test]
    fn drag_end_is_undo_worthy() {
        let (mut diagram, a, _) = two_connected();
        let effects = diagram.apply_node_changes(&[NodeChange::Position {
            id: a,
            position: None,
            dragging: false,
        }]);
        assert!(effects.drag_ended);
        assert!(effects.is_undo_worthy());
    }

    #[test]
    fn remove_change_cascades_edges() {
        let (mut diagram, a, b) = two_connected();
        let effects = diagram.apply_node_changes(&[NodeChange::Remove { id: b }]);
        assert!(effects.structural);
        assert_eq!(effects.removed.as_slice(), &[b]);
        assert!(diagram.edges_touching(a).next().is_none());
    }

    #[test]
    fn select_reports_selection() {
        let (mut diagram, a, _) = two_connected();
        let effects = diagram.apply_node_changes(&[NodeChange::Select {
            id: a,
            selected: true,
        }]);
        assert_eq!(effects.selection, Some((a, true)));
        assert!(!effects.is_undo_worthy());
    }

    #[test]
    fn dimensions_update_data() {
        let (mut diagram, a, _) = two_connected();
        diagram.apply_node_changes(&[NodeChange::Dimensions {
            id: a,
            width: 180.0,
            height: 80.0,
        }]);
        let data = &diagram.node(a).unwrap().data;
        assert_eq!((data.width, data.height), (Some(180.0), Some(80.0)));
    }

    #[test]
    fn edge_add_skips_duplicates_and_dangling() {
        let (mut diagram, a, b) = two_connected();
        let ghost = NodeId::intern("nowhere");
        let effects = diagram.apply_edge_changes(&[
            EdgeChange::Add {
                item: Edge::between(a, b),
            },
            EdgeChange::Add {
                item: Edge::between(b, ghost),
            },
        ]);
        assert!(!effects.structural);
        assert_eq!(diagram.edges.len(), 1);

        let effects = diagram.apply_edge_changes(&[EdgeChange::Add {
            item: Edge::between(b, a),
        }]);
        assert!(effects.structural);
        assert_eq!(diagram.edges.len(), 2);
    }

    #[test]
    fn changes_deserialize_from_canvas_json() {
        let changes: Vec<NodeChange> = serde_json::from_str(
            r#"[
                {"type":"position","id":"n1","position":{"x":1,"y":2},"dragging":true},
                {"type":"select","id":"n1","selected":false},
                {"type":"remove","id":"n1"}
            ]"#,
        )
        .unwrap();
        assert_eq!(changes.len(), 3);
        assert!(matches!(changes[2], NodeChange::Remove { .. }));
    }
}
