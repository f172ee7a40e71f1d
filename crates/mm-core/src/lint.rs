//! Lint diagnostics for diagrams.
//!
//! Reports structural oddities without modifying the diagram. Mind maps are
//! expected to be trees of labelled nodes; anything else is worth a note.

use crate::id::NodeId;
use crate::model::Diagram;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The node this refers to, when there is one.
    pub node_id: Option<NodeId>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "empty-label").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over the diagram.
#[must_use]
pub fn lint_diagram(diagram: &Diagram) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_empty_labels(diagram, &mut diags);
    lint_isolated_nodes(diagram, &mut diags);
    lint_cycles(diagram, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_empty_labels(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    for node in &diagram.nodes {
        if node.data.label.trim().is_empty() {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!("Node {} has an empty label.", node.id),
                severity: LintSeverity::Info,
                rule: "empty-label",
            });
        }
    }
}

fn lint_isolated_nodes(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    if diagram.nodes.len() < 2 {
        return;
    }
    let connected: HashSet<NodeId> = diagram
        .edges
        .iter()
        .flat_map(|e| [e.source, e.target])
        .collect();
    for node in &diagram.nodes {
        if !connected.contains(&node.id) {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!(
                    "Node {} (\"{}\") is not connected to anything.",
                    node.id, node.data.label
                ),
                severity: LintSeverity::Info,
                rule: "isolated-node",
            });
        }
    }
}

fn lint_cycles(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    let mut graph = DiGraph::<NodeId, ()>::with_capacity(diagram.nodes.len(), diagram.edges.len());
    let index: HashMap<NodeId, NodeIndex> = diagram
        .nodes
        .iter()
        .map(|n| (n.id, graph.add_node(n.id)))
        .collect();
    for edge in &diagram.edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
            graph.add_edge(a, b, ());
        }
    }
    if is_cyclic_directed(&graph) {
        diags.push(LintDiagnostic {
            node_id: None,
            message: "Edges form a cycle; the diagram is not a tree.".into(),
            severity: LintSeverity::Warning,
            rule: "cycle",
        });
    }
}
