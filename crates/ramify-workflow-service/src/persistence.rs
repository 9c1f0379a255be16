//! Persistence seam for saved workflows
//!
//! The engine only exposes the present snapshot; what a saved workflow
//! looks like on the wire or on disk is the host's choice, made by
//! plugging a serializer in here.

use tree_engine::WorkflowTree;

use crate::error::Result;

/// Serializer chosen by the embedding host for saved workflows
///
/// Invoked only on an explicit external save or import trigger. The
/// logical schema is the tree's own field names (`nodes`, `rootId`, each
/// node's `id`/`kind`/`label`/`children`); the textual form is up to the
/// implementation.
pub trait SnapshotSerializer: Send + Sync {
    /// Render a snapshot to its persisted text form
    fn serialize(&self, tree: &WorkflowTree) -> Result<String>;

    /// Parse a persisted text form back into a tree
    fn deserialize(&self, text: &str) -> Result<WorkflowTree>;
}

/// JSON serializer matching the tree's canonical field names
pub struct JsonSnapshotSerializer;

impl SnapshotSerializer for JsonSnapshotSerializer {
    fn serialize(&self, tree: &WorkflowTree) -> Result<String> {
        Ok(tree.to_json()?)
    }

    fn deserialize(&self, text: &str) -> Result<WorkflowTree> {
        Ok(WorkflowTree::from_json(text)?)
    }
}
