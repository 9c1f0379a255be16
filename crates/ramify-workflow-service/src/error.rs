//! Error types for the workflow service

use thiserror::Error;

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced at the service boundary
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Error from the tree engine (snapshot serialization)
    #[error("Engine error: {0}")]
    Engine(#[from] tree_engine::TreeEngineError),

    /// The configured serializer rejected a snapshot or saved text
    #[error("Persistence error: {0}")]
    Persistence(String),
}
