//! Integration tests: JSON import validation and export.

use mm_core::document::DocumentFile;
use mm_core::{
    Color, EdgeKind, Error, FontSize, NodeId, NodeKind, export_document_json, lint_diagram,
    parse_document_json,
};
use pretty_assertions::assert_eq;

const DOCUMENT: &str = include_str!("fixtures/document.json");

#[test]
fn valid_document_imports_with_typed_fields() {
    let diagram = parse_document_json(DOCUMENT).unwrap();

    assert_eq!(diagram.name, "Trip Plan");
    assert_eq!(diagram.nodes.len(), 3);
    assert_eq!(diagram.edges.len(), 2);

    let root = diagram.node(NodeId::intern("root")).unwrap();
    assert_eq!(root.data.kind, NodeKind::Primary);
    assert_eq!(root.data.color, Color::from_hex("#6366F1"));
    assert_eq!(root.data.text_color, Some(Color::WHITE));

    let packing = diagram.node(NodeId::intern("packing")).unwrap();
    assert_eq!(packing.data.font_size, Some(FontSize::Lg));
    assert_eq!(packing.data.width, Some(180.0));

    let route = diagram.node(NodeId::intern("route")).unwrap();
    assert_eq!(route.data.kind, NodeKind::Default);
    assert_eq!(route.position.x, -150.5);

    assert_eq!(diagram.edges[0].kind, EdgeKind::SmoothStep);
    assert_eq!(diagram.edges[1].kind, EdgeKind::Default);
    assert!(lint_diagram(&diagram).is_empty());
}

#[test]
fn export_then_import_preserves_diagram() {
    let diagram = parse_document_json(DOCUMENT).unwrap();
    let text = export_document_json(&diagram).unwrap();

    assert!(text.contains("\n  \"nodes\": ["), "export is pretty-printed");
    assert_eq!(parse_document_json(&text).unwrap(), diagram);
}

#[test]
fn export_has_name_field() {
    let diagram = parse_document_json(DOCUMENT).unwrap();
    let text = export_document_json(&diagram).unwrap();
    let doc: DocumentFile = serde_json::from_str(&text).unwrap();
    assert_eq!(doc.name.as_deref(), Some("Trip Plan"));
}

fn rejected(text: &str) -> String {
    match parse_document_json(text) {
        Err(Error::Validation(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn missing_edges_array_is_rejected() {
    let msg = rejected(r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}}]}"#);
    assert!(msg.contains("edges"), "{msg}");
}

#[test]
fn node_without_label_is_rejected() {
    let msg = rejected(r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{}}],"edges":[]}"#);
    assert!(msg.contains("data.label"), "{msg}");
}

#[test]
fn edge_with_numeric_source_is_rejected() {
    let msg = rejected(
        r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}}],
            "edges":[{"id":"e","source":1,"target":"a"}]}"#,
    );
    assert!(msg.contains("source"), "{msg}");
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let msg = rejected(
        r#"{"nodes":[
              {"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}},
              {"id":"a","position":{"x":1,"y":1},"data":{"label":"B"}}],
            "edges":[]}"#,
    );
    assert!(msg.contains("duplicate node id"), "{msg}");
}

#[test]
fn dangling_edge_is_rejected() {
    let msg = rejected(
        r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}}],
            "edges":[{"id":"e","source":"a","target":"b"}]}"#,
    );
    assert!(msg.contains("missing node"), "{msg}");
}

#[test]
fn duplicate_pair_is_rejected() {
    let msg = rejected(
        r#"{"nodes":[
              {"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}},
              {"id":"b","position":{"x":0,"y":0},"data":{"label":"B"}}],
            "edges":[{"id":"e1","source":"a","target":"b"},{"id":"e2","source":"a","target":"b"}]}"#,
    );
    assert!(msg.contains("duplicate edge"), "{msg}");
}

#[test]
fn invalid_color_is_rejected() {
    let msg = rejected(
        r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A","color":"blue"}}],"edges":[]}"#,
    );
    assert!(msg.contains("invalid color"), "{msg}");
}

#[test]
fn added_edge_avoids_imported_id_with_same_derivation() {
    let text = r#"{
        "name": "Hyphens",
        "nodes": [
            {"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}},
            {"id":"a-b","position":{"x":10,"y":0},"data":{"label":"AB"}},
            {"id":"b-c","position":{"x":20,"y":0},"data":{"label":"BC"}},
            {"id":"c","position":{"x":30,"y":0},"data":{"label":"C"}}
        ],
        "edges": [{"id":"ea-b-c","source":"a-b","target":"c"}]
    }"#;
    let mut diagram = parse_document_json(text).unwrap();
    let added = diagram
        .add_edge(NodeId::intern("a"), NodeId::intern("b-c"))
        .unwrap()
        .unwrap();

    assert_ne!(added, NodeId::intern("ea-b-c"));
    assert_eq!(diagram.edges.len(), 2);

    let reimported = parse_document_json(&export_document_json(&diagram).unwrap()).unwrap();
    assert_eq!(reimported.edges, diagram.edges);
}
