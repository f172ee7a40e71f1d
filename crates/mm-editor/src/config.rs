//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes.

use mm_core::layout::DEFAULT_LAYOUT_RADIUS;
use mm_core::{Position, UNTITLED};
use serde::{Deserialize, Serialize};

/// Default cap on undo history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history entries kept (at least 1).
    pub history_limit: usize,
    /// Write the current document to storage after every committed change.
    pub autosave: bool,
    /// Name of new documents.
    pub default_name: String,
    /// Label used when a node's label is committed blank.
    pub default_label: String,
    /// Where generated diagrams put their root node.
    pub generator_center: Position,
    /// Radius of the circular auto-layout.
    pub layout_radius: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave: true,
            default_name: UNTITLED.to_string(),
            default_label: "New Node".to_string(),
            generator_center: Position::ORIGIN,
            layout_radius: DEFAULT_LAYOUT_RADIUS,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json(text: &str) -> mm_core::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
