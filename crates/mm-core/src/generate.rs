//! Outline → diagram generator (radial layout).
//!
//! The root sits at the requested center. Each node's children are spread
//! evenly on a circle around it, with the radius growing by depth so deeper
//! levels are pushed further out. Node categories cycle through
//! [`NodeKind::PALETTE`] by depth.

use crate::error::{Error, Result};
use crate::id::NodeId;
use crate::model::{Diagram, Edge, Node, NodeData, NodeKind, Position};
use crate::outline::OutlineNode;
use std::f64::consts::TAU;

/// Radius of the first ring around the root.
pub const BASE_RADIUS: f64 = 150.0;
/// Added radius per level of depth.
pub const RADIUS_STEP: f64 = 100.0;

/// Build a fresh diagram from `outline`, rooted at `center`.
///
/// Fails with `Validation` when the outline root has a blank title.
pub fn generate_diagram(outline: &OutlineNode, center: Position) -> Result<Diagram> {
    let title = outline.title.trim();
    if title.is_empty() {
        return Err(Error::Validation("outline root has no title".into()));
    }
    if !center.is_finite() {
        return Err(Error::Validation("generator center is not finite".into()));
    }

    let root = Node::new(
        NodeId::fresh(),
        center,
        NodeData::labeled(title).with_kind(NodeKind::Primary),
    );
    let (descendants, edges) = place_children(&outline.children, root.id, center, 0);

    let mut nodes = Vec::with_capacity(descendants.len() + 1);
    nodes.push(root);
    nodes.extend(descendants);

    log::info!(
        "generated diagram \"{title}\": {} node(s), {} edge(s)",
        nodes.len(),
        edges.len()
    );
    Ok(Diagram {
        nodes,
        edges,
        name: title.to_string(),
    })
}

/// A child waiting to be placed: its outline entry, the already placed
/// parent and where it goes.
struct Pending<'a> {
    outline: &'a OutlineNode,
    parent: NodeId,
    position: Position,
    level: usize,
}

/// Lay out `children` around `origin`, depth-first with an explicit work
/// stack. Returns the placed subtree nodes (pre-order) and the
/// parent → child edges.
fn place_children(
    children: &[OutlineNode],
    parent: NodeId,
    origin: Position,
    level: usize,
) -> (Vec<Node>, Vec<Edge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut pending = Vec::new();
    push_ring(&mut pending, children, parent, origin, level);

    while let Some(next) = pending.pop() {
        let kind = NodeKind::for_level(next.level);
        let node = Node::new(
            NodeId::fresh(),
            next.position,
            NodeData::labeled(next.outline.title.clone()).with_kind(kind),
        );
        let id = node.id;
        nodes.push(node);
        edges.push(Edge::between(next.parent, id));
        push_ring(
            &mut pending,
            &next.outline.children,
            id,
            next.position,
            next.level + 1,
        );
    }
    (nodes, edges)
}

/// Queue `children` evenly spaced on the ring of `level` around `origin`.
/// Pushed in reverse so they pop in outline order.
fn push_ring<'a>(
    pending: &mut Vec<Pending<'a>>,
    children: &'a [OutlineNode],
    parent: NodeId,
    origin: Position,
    level: usize,
) {
    if children.is_empty() {
        return;
    }
    let step = TAU / children.len() as f64;
    let radius = BASE_RADIUS + RADIUS_STEP * level as f64;
    for (i, child) in children.iter().enumerate().rev() {
        let angle = i as f64 * step;
        pending.push(Pending {
            outline: child,
            parent,
            position: Position::new(
                origin.x + radius * angle.cos(),
                origin.y + radius * angle.sin(),
            ),
            level,
        });
    }
}
