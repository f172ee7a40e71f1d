pub mod config;
pub mod history;
pub mod session;
pub mod shortcuts;
pub mod storage;

pub use config::EditorConfig;
pub use history::History;
pub use session::Session;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SavedDocument};
