//! Error types for the tree engine
//!
//! Inapplicable edit requests are not errors — they resolve to silent
//! no-ops by design. Only the serialization boundary is fallible here.

use thiserror::Error;

/// Result type alias using TreeEngineError
pub type Result<T> = std::result::Result<T, TreeEngineError>;

/// Errors that can occur in the tree engine
#[derive(Debug, Error)]
pub enum TreeEngineError {
    /// Snapshot (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
