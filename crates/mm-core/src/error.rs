//! Error type shared by every Mind Mapper crate.

use crate::id::NodeId;

/// Everything that can go wrong in the editor core.
///
/// None of these are fatal: callers degrade to "no-op plus a message".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed import JSON, outline input, or a mutation argument that
    /// would break a model invariant.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutation referenced a node or edge id that is not in the diagram.
    #[error("{0} not found")]
    NotFound(NodeId),

    /// Key-value storage read/write failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Document text yielded no usable structure.
    #[error("conversion failed: {0}")]
    Conversion(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(err.to_string())
    }
}
