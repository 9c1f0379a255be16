//! Host-agnostic workflow editing services for Ramify
//!
//! A thin application layer over `tree-engine`: it owns one workflow's
//! history, identifier source, and snapshot serializer, and exposes the
//! request surface a presentation layer drives. Hosts embed this crate
//! and keep rendering, input handling, and storage transport on their
//! side of the boundary.

pub mod error;
pub mod persistence;
pub mod service;

// Re-export key types
pub use error::{Result, ServiceError};
pub use persistence::{JsonSnapshotSerializer, SnapshotSerializer};
pub use service::{WorkflowRequest, WorkflowService};

// Re-export engine types that consumers will need
pub use tree_engine::{EditRequest, NodeKind, WorkflowNode, WorkflowTree};
