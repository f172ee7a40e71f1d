//! JSON document import/export.
//!
//! Import is all-or-nothing: the payload is first checked against the file
//! contract on the raw JSON value (so messages can name the offending
//! element), then decoded, then checked against the model invariants. Any
//! failure rejects the whole document.

use crate::error::{Error, Result};
use crate::model::{Diagram, Edge, Node, UNTITLED};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// On-disk shape of a document: `{ nodes, edges, name? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Diagram> for DocumentFile {
    fn from(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram.nodes.clone(),
            edges: diagram.edges.clone(),
            name: Some(diagram.name.clone()),
        }
    }
}

impl TryFrom<DocumentFile> for Diagram {
    type Error = Error;

    fn try_from(doc: DocumentFile) -> Result<Self> {
        check_invariants(&doc)?;
        Ok(Diagram {
            nodes: doc.nodes,
            edges: doc.edges,
            name: doc
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
        })
    }
}

/// Parse and validate an imported document.
pub fn parse_document_json(text: &str) -> Result<Diagram> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Validation(format!("not valid JSON: {e}")))?;
    check_contract(&value)?;
    let doc: DocumentFile = serde_json::from_value(value)?;
    Diagram::try_from(doc)
}

/// Pretty-printed `{ nodes, edges, name }`.
pub fn export_document_json(diagram: &Diagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(&DocumentFile::from(diagram))?)
}

/// File name for an exported document: `name.json`, whitespace runs
/// replaced by `_`, `mindmap.json` when unnamed.
pub fn export_file_name(name: &str) -> String {
    let name = name.trim();
    let base = if name.is_empty() { "mindmap" } else { name };
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{joined}.json")
}

// ─── File contract ───────────────────────────────────────────────────────

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

fn check_contract(value: &Value) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("document must be a JSON object"))?;
    let nodes = obj
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("document has no `nodes` array"))?;
    let edges = obj
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("document has no `edges` array"))?;
    if obj.get("name").is_some_and(|n| !n.is_string() && !n.is_null()) {
        return Err(invalid("`name` must be a string"));
    }

    for (i, node) in nodes.iter().enumerate() {
        if !has_id(node) {
            return Err(invalid(format!("node #{i} has no id")));
        }
        let position = node.get("position");
        let numeric = |axis: &str| position.and_then(|p| p.get(axis)).is_some_and(Value::is_number);
        if !numeric("x") || !numeric("y") {
            return Err(invalid(format!("node #{i} has no numeric position")));
        }
        if !node.pointer("/data/label").is_some_and(Value::is_string) {
            return Err(invalid(format!("node #{i} has no string data.label")));
        }
    }

    for (i, edge) in edges.iter().enumerate() {
        if !has_id(edge) {
            return Err(invalid(format!("edge #{i} has no id")));
        }
        for end in ["source", "target"] {
            if !edge.get(end).is_some_and(Value::is_string) {
                return Err(invalid(format!("edge #{i} has no string {end}")));
            }
        }
    }
    Ok(())
}

fn has_id(element: &Value) -> bool {
    element
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

fn check_invariants(doc: &DocumentFile) -> Result<()> {
    let mut node_ids = HashSet::new();
    for node in &doc.nodes {
        if !node_ids.insert(node.id) {
            return Err(invalid(format!("duplicate node id {}", node.id)));
        }
        if !node.position.is_finite() {
            return Err(invalid(format!("node {} has a non-finite position", node.id)));
        }
    }

    let mut edge_ids = HashSet::new();
    let mut pairs = HashSet::new();
    for edge in &doc.edges {
        if !edge_ids.insert(edge.id) {
            return Err(invalid(format!("duplicate edge id {}", edge.id)));
        }
        if !pairs.insert((edge.source, edge.target)) {
            return Err(invalid(format!(
                "duplicate edge {} -> {}",
                edge.source, edge.target
            )));
        }
        for end in [edge.source, edge.target] {
            if !node_ids.contains(&end) {
                return Err(invalid(format!("edge {} references missing node {end}", edge.id)));
            }
        }
    }
    Ok(())
}
