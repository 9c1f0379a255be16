//! Tree Engine - Workflow tree editing core for Ramify
//!
//! This crate provides the data model and edit semantics behind a visual
//! workflow builder. It supports:
//!
//! - A typed tree of workflow steps with fixed per-kind slot counts
//! - Pure copy-on-write mutations (add / delete / rename / replace)
//! - Successor promotion on delete, orphaning on capacity mismatch
//! - Linear snapshot-based undo/redo
//!
//! # Architecture
//!
//! Trees are immutable snapshot values over a shared node arena:
//!
//! - `types`: the arena, node records, and the derived parent index
//! - `mutation`: pure functions from snapshot + edit request to the next
//!   snapshot; inapplicable requests are silent no-ops
//! - `history`: the past/present/future stack wrapping those mutations
//! - `validation`: structural checks for trees arriving from outside
//!
//! Identifier allocation is a collaborator, not part of the engine; see
//! the `ramify-identity` crate.
//!
//! # Example
//!
//! ```
//! use ramify_identity::SequentialIds;
//! use tree_engine::{
//!     EditRequest, IdentifierSource, NodeKind, WorkflowHistory, WorkflowTree,
//! };
//!
//! let mut ids = SequentialIds::default();
//! let mut history = WorkflowHistory::new(WorkflowTree::new(ids.next_id()));
//!
//! let applied = history.apply(
//!     &EditRequest::AddNode {
//!         parent_id: "node-1".to_string(),
//!         slot: 0,
//!         kind: NodeKind::Action,
//!     },
//!     &mut ids,
//! );
//! assert!(applied);
//! assert!(history.can_undo());
//! ```

pub mod error;
pub mod history;
pub mod mutation;
pub mod types;
pub mod validation;

// Re-export key types
pub use error::{Result, TreeEngineError};
pub use history::WorkflowHistory;
pub use mutation::{add_node, apply_edit, delete_node, update_label, EditRequest};
pub use types::{NodeId, NodeKind, ParentLink, WorkflowNode, WorkflowTree};
pub use validation::{validate_tree, TreeViolation};

// Re-export the identifier contract that consumers will need
pub use ramify_identity::IdentifierSource;
