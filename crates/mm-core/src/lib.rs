pub mod changes;
pub mod document;
pub mod error;
pub mod generate;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod outline;

pub use changes::{ChangeEffects, EdgeChange, NodeChange};
pub use document::{export_document_json, export_file_name, parse_document_json};
pub use error::{Error, Result};
pub use generate::generate_diagram;
pub use id::{EdgeId, NodeId};
pub use layout::arrange_in_circle;
pub use lint::{LintDiagnostic, LintSeverity, lint_diagram};
pub use model::*;
pub use outline::{MAX_OUTLINE_DEPTH, OutlineNode, infer_outline, infer_outline_strict};
