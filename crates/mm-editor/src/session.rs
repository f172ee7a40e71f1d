//! The editing session: one owned controller per open document.
//!
//! The session holds the authoritative [`Diagram`] and everything that
//! travels with it: undo history, selection, configuration and an optional
//! storage backend. All mutation goes through its methods, which decide what
//! is undo-worthy.
//!
//! History entries are diagram states. The entry at the cursor always equals
//! the state the next mutation starts from, so recording the post-mutation
//! state after each committed action makes "undo" restore exactly the
//! pre-mutation state. A commit that leaves the diagram equal to the cursor
//! entry records nothing.
//!
//! Transient edits such as drag frames or typing before blur go through
//! [`Session::preview_node`] or the canvas change reducers and are folded
//! into the next commit. Continuous interactions can be wrapped
//! in [`Session::begin_gesture`] / [`Session::end_gesture`] to produce a
//! single entry.

use crate::config::EditorConfig;
use crate::history::History;
use crate::shortcuts::ShortcutAction;
use crate::storage::{self, CURRENT_DOCUMENT_KEY, KeyValueStore, SavedDocument};
use mm_core::{
    ChangeEffects, Diagram, EdgeChange, EdgeId, Error, NodeChange, NodeData, NodeDataPatch,
    NodeId, NodeKind, OutlineNode, Position, Result, arrange_in_circle, export_document_json,
    export_file_name, generate_diagram, infer_outline, lint_diagram, parse_document_json,
};

pub struct Session {
    diagram: Diagram,
    history: History,
    selected: Option<NodeId>,
    config: EditorConfig,
    store: Option<Box<dyn KeyValueStore>>,
    /// Open gesture nesting depth; commits are deferred while non-zero.
    gesture_depth: usize,
    /// Catalogue id of the saved document this session was opened from or
    /// last saved to.
    document_id: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Session {
    /// An empty, unsaved document without storage.
    pub fn new(config: EditorConfig) -> Self {
        let diagram = Diagram::new(config.default_name.clone());
        let mut history = History::new(config.history_limit);
        history.reset(diagram.snapshot());
        Self {
            diagram,
            history,
            selected: None,
            config,
            store: None,
            gesture_depth: 0,
            document_id: None,
        }
    }

    /// A session over `store`, resuming the stored current document if
    /// there is a readable one.
    pub fn with_store(config: EditorConfig, store: Box<dyn KeyValueStore>) -> Self {
        let mut session = Self::new(config);
        match storage::load_current(&*store) {
            Ok(Some(diagram)) => {
                log::info!(
                    "resumed \"{}\" ({} nodes, {} edges)",
                    diagram.name,
                    diagram.nodes.len(),
                    diagram.edges.len()
                );
                session.history.reset(diagram.snapshot());
                session.diagram = diagram;
            }
            Ok(None) => {}
            Err(e) => log::warn!("ignoring stored document: {e}"),
        }
        session.store = Some(store);
        session
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn store(&self) -> Option<&dyn KeyValueStore> {
        self.store.as_deref()
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_depth > 0
    }

    // ─── Node and edge edits ─────────────────────────────────────────────

    pub fn add_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        position: Position,
        data: NodeData,
    ) -> Result<NodeId> {
        let id = self.diagram.add_node(kind, parent, position, data)?;
        self.commit();
        Ok(id)
    }

    /// Merge `patch` into a node's data as one undoable step.
    pub fn update_node(&mut self, id: NodeId, patch: &NodeDataPatch) -> Result<()> {
        self.diagram.update_node(id, patch)?;
        self.commit();
        Ok(())
    }

    /// Merge `patch` without recording history. The change becomes part of
    /// whatever is committed next.
    pub fn preview_node(&mut self, id: NodeId, patch: &NodeDataPatch) -> Result<()> {
        self.diagram.update_node(id, patch)
    }

    /// Commit an edited label: trimmed, with a blank label replaced by the
    /// configured default. Returns whether a history entry was recorded.
    pub fn commit_label(&mut self, id: NodeId, label: &str) -> Result<bool> {
        let trimmed = label.trim();
        let label = if trimmed.is_empty() {
            self.config.default_label.as_str()
        } else {
            trimmed
        };
        let node = self.diagram.node_mut(id).ok_or(Error::NotFound(id))?;
        if node.data.label != label {
            node.data.label = label.to_string();
        }
        Ok(self.commit())
    }

    /// Delete a node and its edges, clearing the selection if it pointed
    /// at that node.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.diagram.delete_node(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
        Ok(())
    }

    /// Delete the selected node. `Ok(false)` when nothing is selected.
    pub fn delete_selected(&mut self) -> Result<bool> {
        let Some(id) = self.selected else {
            return Ok(false);
        };
        self.delete_node(id)?;
        Ok(true)
    }

    /// Connect two nodes. `Ok(None)` when they already are.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<Option<EdgeId>> {
        let added = self.diagram.add_edge(source, target)?;
        if added.is_some() {
            self.commit();
        }
        Ok(added)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<()> {
        self.diagram.remove_edge(id)?;
        self.commit();
        Ok(())
    }

    /// Apply canvas node deltas. Only structural changes and finished drags
    /// are committed; selection follows the batch.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> ChangeEffects {
        let effects = self.diagram.apply_node_changes(changes);
        if let Some((id, selected)) = effects.selection {
            if selected {
                self.selected = Some(id);
            } else if self.selected == Some(id) {
                self.selected = None;
            }
        }
        if self
            .selected
            .is_some_and(|id| effects.removed.contains(&id))
        {
            self.selected = None;
        }
        if effects.is_undo_worthy() {
            self.commit();
        }
        effects
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> ChangeEffects {
        let effects = self.diagram.apply_edge_changes(changes);
        if effects.is_undo_worthy() {
            self.commit();
        }
        effects
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Start a continuous interaction. Commits inside it are deferred to
    /// the matching [`end_gesture`](Self::end_gesture). Gestures nest.
    pub fn begin_gesture(&mut self) {
        self.gesture_depth += 1;
    }

    /// Finish a gesture. Returns whether closing the outermost gesture
    /// recorded a history entry.
    pub fn end_gesture(&mut self) -> bool {
        if self.gesture_depth == 0 {
            return false;
        }
        self.gesture_depth -= 1;
        if self.gesture_depth > 0 {
            return false;
        }
        self.commit()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_node(&mut self, id: Option<NodeId>) -> Result<()> {
        if let Some(id) = id {
            if !self.diagram.contains_node(id) {
                return Err(Error::NotFound(id));
            }
        }
        self.selected = id;
        Ok(())
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one entry. `false` (and no change) at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.diagram.restore(snapshot);
        self.selected = None;
        self.autosave();
        true
    }

    /// Step forward one entry. `false` (and no change) at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.diagram.restore(snapshot);
        self.selected = None;
        self.autosave();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Whole-document operations ───────────────────────────────────────

    /// Discard the current document and start an empty one.
    pub fn new_document(&mut self) {
        self.replace_diagram(Diagram::new(self.config.default_name.clone()));
        self.document_id = None;
    }

    /// Swap in a whole diagram as a fresh document: history restarts from
    /// it and the selection is cleared.
    pub fn replace_diagram(&mut self, diagram: Diagram) {
        self.history.reset(diagram.snapshot());
        self.diagram = diagram;
        self.selected = None;
        self.gesture_depth = 0;
        self.autosave();
    }

    /// Import a JSON document. On error the live diagram is untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let diagram = parse_document_json(text)?;
        for diag in lint_diagram(&diagram) {
            log::warn!("[{}] {}", diag.rule, diag.message);
        }
        log::info!(
            "imported \"{}\" ({} nodes, {} edges)",
            diagram.name,
            diagram.nodes.len(),
            diagram.edges.len()
        );
        self.replace_diagram(diagram);
        self.document_id = None;
        Ok(())
    }

    /// Pretty-printed `{nodes, edges, name}`.
    pub fn export_json(&self) -> Result<String> {
        export_document_json(&self.diagram)
    }

    /// Suggested file name for [`export_json`](Self::export_json).
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.diagram.name)
    }

    /// Replace the document with the radial diagram of `outline`.
    pub fn load_outline(&mut self, outline: &OutlineNode) -> Result<()> {
        let diagram = generate_diagram(outline, self.config.generator_center)?;
        log::info!(
            "generated \"{}\" with {} nodes",
            diagram.name,
            diagram.nodes.len()
        );
        self.replace_diagram(diagram);
        self.document_id = None;
        Ok(())
    }

    /// Infer an outline from extracted document text and load it.
    pub fn convert_document(&mut self, text: &str, file_name: &str) -> Result<()> {
        let outline = infer_outline(text, file_name);
        self.load_outline(&outline)
    }

    /// Spread all nodes on a circle around the configured center. Returns
    /// whether anything moved; a non-finite radius or center is rejected.
    pub fn auto_layout(&mut self) -> Result<bool> {
        arrange_in_circle(
            &mut self.diagram,
            self.config.generator_center,
            self.config.layout_radius,
        )?;
        Ok(self.commit())
    }

    /// Rename the document; a blank name becomes the configured default.
    /// Names are not part of undo history.
    pub fn set_name(&mut self, name: &str) {
        let trimmed = name.trim();
        self.diagram.name = if trimmed.is_empty() {
            self.config.default_name.clone()
        } else {
            trimmed.to_string()
        };
        self.autosave();
    }

    // ─── Saved catalogue ─────────────────────────────────────────────────

    fn store_mut(&mut self) -> Result<&mut (dyn KeyValueStore + 'static)> {
        self.store
            .as_deref_mut()
            .ok_or_else(|| Error::Storage("no store attached".into()))
    }

    fn store_ref(&self) -> Result<&(dyn KeyValueStore + 'static)> {
        self.store
            .as_deref()
            .ok_or_else(|| Error::Storage("no store attached".into()))
    }

    /// Save to the catalogue, overwriting the entry this document came from
    /// when there is one.
    pub fn save(&mut self) -> Result<SavedDocument> {
        let id = self.document_id.clone();
        let diagram = self.diagram.clone();
        let record = storage::save_document(self.store_mut()?, id.as_deref(), &diagram)?;
        self.document_id = Some(record.id.clone());
        Ok(record)
    }

    /// Rename and save as a new catalogue entry.
    pub fn save_as(&mut self, name: &str) -> Result<SavedDocument> {
        self.set_name(name);
        self.document_id = None;
        self.save()
    }

    pub fn list_saved(&self) -> Result<Vec<SavedDocument>> {
        storage::list_saved(self.store_ref()?)
    }

    /// Open a catalogue entry as the current document.
    pub fn open_saved(&mut self, id: &str) -> Result<()> {
        let record = storage::get_saved(self.store_ref()?, id)?
            .ok_or_else(|| Error::Storage(format!("no saved document `{id}`")))?;
        let diagram = record.to_diagram()?;
        self.replace_diagram(diagram);
        self.document_id = Some(record.id);
        Ok(())
    }

    /// Remove a catalogue entry. Returns whether it existed.
    pub fn delete_saved(&mut self, id: &str) -> Result<bool> {
        let deleted = storage::delete_saved(self.store_mut()?, id)?;
        if deleted && self.document_id.as_deref() == Some(id) {
            self.document_id = None;
        }
        Ok(deleted)
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Run a shortcut action. Returns whether anything changed.
    pub fn dispatch(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected().unwrap_or_else(|e| {
                log::warn!("delete failed: {e}");
                false
            }),
            ShortcutAction::Deselect => self.selected.take().is_some(),
            ShortcutAction::Save => match self.save() {
                Ok(_) => true,
                Err(e) => {
                    log::error!("save failed: {e}");
                    false
                }
            },
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Record the live state if it differs from the cursor entry. Deferred
    /// while a gesture is open. Returns whether an entry was recorded.
    fn commit(&mut self) -> bool {
        if self.gesture_depth > 0 {
            return false;
        }
        if self
            .history
            .current()
            .is_some_and(|current| self.diagram.matches(current))
        {
            return false;
        }
        self.history.record(self.diagram.snapshot());
        self.autosave();
        true
    }

    /// Best-effort write of the current document; failures are logged.
    /// An empty diagram clears the stored record instead.
    fn autosave(&mut self) {
        if !self.config.autosave {
            return;
        }
        let Some(store) = self.store.as_deref_mut() else {
            return;
        };
        let saved = if self.diagram.nodes.is_empty() {
            store.remove(CURRENT_DOCUMENT_KEY)
        } else {
            storage::store_current(store, &self.diagram)
        };
        if let Err(e) = saved {
            log::warn!("autosave failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::Color;

    fn session_with_root() -> (Session, NodeId) {
        let mut session = Session::default();
        let root = session
            .add_node(
                NodeKind::Primary,
                None,
                Position::ORIGIN,
                NodeData::labeled("Root"),
            )
            .unwrap();
        (session, root)
    }

    #[test]
    fn new_session_has_nothing_to_undo() {
        let session = Session::default();
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.diagram().name, mm_core::UNTITLED);
    }

    #[test]
    fn undo_restores_pre_mutation_state_and_clears_selection() {
        let (mut session, root) = session_with_root();
        session.select_node(Some(root)).unwrap();
        assert!(session.undo());
        assert!(session.diagram().nodes.is_empty());
        assert_eq!(session.selected(), None);
        assert!(session.redo());
        assert!(session.diagram().contains_node(root));
    }

    #[test]
    fn preview_is_folded_into_next_commit() {
        let (mut session, root) = session_with_root();
        let entries = session.history().len();
        session
            .preview_node(root, &NodeDataPatch::color(Color::BLACK))
            .unwrap();
        assert_eq!(session.history().len(), entries);

        session.commit_label(root, "  Renamed ").unwrap();
        assert_eq!(session.history().len(), entries + 1);
        let data = &session.diagram().node(root).unwrap().data;
        assert_eq!(data.label, "Renamed");
        assert_eq!(data.color, Some(Color::BLACK));
    }

    #[test]
    fn blank_label_becomes_default() {
        let (mut session, root) = session_with_root();
        assert!(session.commit_label(root, "   ").unwrap());
        assert_eq!(session.diagram().node(root).unwrap().data.label, "New Node");
    }

    #[test]
    fn unchanged_label_records_nothing() {
        let (mut session, root) = session_with_root();
        assert!(!session.commit_label(root, "Root").unwrap());
    }

    #[test]
    fn delete_selected_clears_selection() {
        let (mut session, root) = session_with_root();
        assert!(!session.delete_selected().unwrap());
        session.select_node(Some(root)).unwrap();
        assert!(session.delete_selected().unwrap());
        assert_eq!(session.selected(), None);
        assert!(session.diagram().nodes.is_empty());
    }

    #[test]
    fn selecting_missing_node_is_not_found() {
        let mut session = Session::default();
        let ghost = NodeId::intern("not-here");
        assert_eq!(session.select_node(Some(ghost)), Err(Error::NotFound(ghost)));
    }

    #[test]
    fn canvas_deselect_and_remove_follow_selection() {
        let (mut session, root) = session_with_root();
        session.apply_node_changes(&[NodeChange::Select {
            id: root,
            selected: true,
        }]);
        assert_eq!(session.selected(), Some(root));
        session.apply_node_changes(&[NodeChange::Remove { id: root }]);
        assert_eq!(session.selected(), None);
        assert!(session.can_undo());
    }

    #[test]
    fn dispatch_deselect_reports_change() {
        let (mut session, root) = session_with_root();
        session.select_node(Some(root)).unwrap();
        assert!(session.dispatch(ShortcutAction::Deselect));
        assert!(!session.dispatch(ShortcutAction::Deselect));
    }

    #[test]
    fn save_without_store_fails_softly() {
        let (mut session, _) = session_with_root();
        assert!(matches!(session.save(), Err(Error::Storage(_))));
        assert!(!session.dispatch(ShortcutAction::Save));
    }

    #[test]
    fn set_name_blank_falls_back() {
        let mut session = Session::default();
        session.set_name("  Road trip ");
        assert_eq!(session.diagram().name, "Road trip");
        assert_eq!(session.export_file_name(), "Road_trip.json");
        session.set_name("");
        assert_eq!(session.diagram().name, mm_core::UNTITLED);
    }
}
