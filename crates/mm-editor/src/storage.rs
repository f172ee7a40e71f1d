//! Persistent key/value storage for documents.
//!
//! Two records live in a store:
//!
//! - [`CURRENT_DOCUMENT_KEY`]: the document being edited, `{nodes, edges, name}`.
//! - [`SAVED_DOCUMENTS_KEY`]: the saved catalogue, a JSON array of
//!   [`SavedDocument`].
//!
//! Values are JSON strings. Every failure is reported as `Error::Storage`;
//! the session decides whether to surface or swallow it.

use chrono::{DateTime, Utc};
use mm_core::document::DocumentFile;
use mm_core::{Diagram, Error, Result, export_document_json, parse_document_json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CURRENT_DOCUMENT_KEY: &str = "currentMindMap";
pub const SAVED_DOCUMENTS_KEY: &str = "savedMindMaps";

/// String-keyed store of JSON values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ─── Backends ────────────────────────────────────────────────────────────

/// In-memory store, used by tests and embedders without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Storage(format!("{}: {source}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| io_error(&self.root, source))?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| io_error(&path, source))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(&path, source)),
        }
    }
}

/// Keys made of `[A-Za-z0-9_-]` map to themselves; anything else is
/// hex-encoded behind a `~` so it can't escape the directory.
fn encode_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if plain {
        return key.to_string();
    }
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + key.len() * 2);
    out.push('~');
    for &b in key.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

// ─── Current document ────────────────────────────────────────────────────

/// Read the current-document record. `Ok(None)` when nothing was stored.
pub fn load_current<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Diagram>> {
    let Some(text) = store.get(CURRENT_DOCUMENT_KEY)? else {
        return Ok(None);
    };
    parse_document_json(&text)
        .map(Some)
        .map_err(|e| Error::Storage(format!("stored {CURRENT_DOCUMENT_KEY} is unreadable: {e}")))
}

pub fn store_current<S: KeyValueStore + ?Sized>(store: &mut S, diagram: &Diagram) -> Result<()> {
    let text = export_document_json(diagram)?;
    store.set(CURRENT_DOCUMENT_KEY, &text)
}

// ─── Saved catalogue ─────────────────────────────────────────────────────

/// One entry of the saved catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub id: String,
    #[serde(flatten)]
    pub document: DocumentFile,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl SavedDocument {
    pub fn name(&self) -> &str {
        self.document.name.as_deref().unwrap_or(mm_core::UNTITLED)
    }

    pub fn to_diagram(&self) -> Result<Diagram> {
        Diagram::try_from(self.document.clone())
    }
}

/// Every saved document, oldest first. An absent catalogue is empty.
pub fn list_saved<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<SavedDocument>> {
    match store.get(SAVED_DOCUMENTS_KEY)? {
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            Error::Storage(format!("stored {SAVED_DOCUMENTS_KEY} is unreadable: {e}"))
        }),
        None => Ok(Vec::new()),
    }
}

fn write_saved<S: KeyValueStore + ?Sized>(store: &mut S, saved: &[SavedDocument]) -> Result<()> {
    let text = serde_json::to_string(saved)
        .map_err(|e| Error::Storage(format!("cannot encode {SAVED_DOCUMENTS_KEY}: {e}")))?;
    store.set(SAVED_DOCUMENTS_KEY, &text)
}

pub fn get_saved<S: KeyValueStore + ?Sized>(store: &S, id: &str) -> Result<Option<SavedDocument>> {
    Ok(list_saved(store)?.into_iter().find(|doc| doc.id == id))
}

/// Save `diagram` into the catalogue.
///
/// With the `id` of an existing entry, that entry is overwritten: its
/// `dateCreated` is kept and `dateModified` refreshed. Otherwise a new entry
/// is appended under a fresh millisecond-timestamp id.
pub fn save_document<S: KeyValueStore + ?Sized>(
    store: &mut S,
    id: Option<&str>,
    diagram: &Diagram,
) -> Result<SavedDocument> {
    let mut saved = list_saved(store)?;
    let now = Utc::now();
    let document = DocumentFile::from(diagram);

    let record = match id.and_then(|id| saved.iter_mut().find(|doc| doc.id == id)) {
        Some(existing) => {
            existing.document = document;
            existing.date_modified = now;
            existing.clone()
        }
        None => {
            let mut stamp = now.timestamp_millis();
            while saved.iter().any(|doc| doc.id == stamp.to_string()) {
                stamp += 1;
            }
            let record = SavedDocument {
                id: stamp.to_string(),
                document,
                date_created: now,
                date_modified: now,
            };
            saved.push(record.clone());
            record
        }
    };

    write_saved(store, &saved)?;
    log::info!("saved \"{}\" as {}", record.name(), record.id);
    Ok(record)
}

/// Remove an entry. Returns whether it existed.
pub fn delete_saved<S: KeyValueStore + ?Sized>(store: &mut S, id: &str) -> Result<bool> {
    let mut saved = list_saved(store)?;
    let before = saved.len();
    saved.retain(|doc| doc.id != id);
    if saved.len() == before {
        return Ok(false);
    }
    write_saved(store, &saved)?;
    Ok(true)
}
