//! The workflow editing facade a presentation layer drives
//!
//! One service instance owns one workflow: its undo/redo history, its
//! identifier source, and its snapshot serializer. Requests are applied
//! one at a time in arrival order; each completes before the caller can
//! issue the next, so no locking or queuing is involved.

use serde::{Deserialize, Serialize};

use ramify_identity::IdentifierSource;
use tree_engine::{
    validate_tree, EditRequest, NodeId, NodeKind, TreeViolation, WorkflowHistory, WorkflowTree,
};

use crate::error::Result;
use crate::persistence::SnapshotSerializer;

/// A request issued by the presentation layer
///
/// The first four variants edit the tree through the mutation engine;
/// `Undo` and `Redo` bypass it and move snapshots within the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkflowRequest {
    /// Insert a new node into `slot` of `parent_id`
    #[serde(rename_all = "camelCase")]
    AddNode {
        parent_id: NodeId,
        slot: usize,
        kind: NodeKind,
    },
    /// Remove a node, promoting its first live child
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: NodeId },
    /// Replace a node's display label
    #[serde(rename_all = "camelCase")]
    UpdateLabel { node_id: NodeId, label: String },
    /// Replace the whole tree (always recorded in history)
    #[serde(rename_all = "camelCase")]
    LoadTree { tree: WorkflowTree },
    /// Step back one snapshot
    Undo,
    /// Step forward one snapshot
    Redo,
}

/// Host-agnostic facade over one workflow's editing session
pub struct WorkflowService {
    history: WorkflowHistory,
    ids: Box<dyn IdentifierSource>,
    serializer: Box<dyn SnapshotSerializer>,
}

impl WorkflowService {
    /// Start a session on a fresh single-start tree
    ///
    /// The root node's id is drawn from `ids` like every later node's.
    pub fn new(
        mut ids: Box<dyn IdentifierSource>,
        serializer: Box<dyn SnapshotSerializer>,
    ) -> Self {
        let root_id = ids.next_id();
        Self {
            history: WorkflowHistory::new(WorkflowTree::new(root_id)),
            ids,
            serializer,
        }
    }

    /// Start a session on an existing tree (restore at boot)
    ///
    /// The caller is responsible for pairing the tree with an identifier
    /// source that will not reissue ids already present in it.
    pub fn with_tree(
        mut tree: WorkflowTree,
        ids: Box<dyn IdentifierSource>,
        serializer: Box<dyn SnapshotSerializer>,
    ) -> Self {
        tree.reindex_parents();
        Self {
            history: WorkflowHistory::new(tree),
            ids,
            serializer,
        }
    }

    /// The snapshot the presentation layer renders from
    pub fn tree(&self) -> &WorkflowTree {
        self.history.present()
    }

    /// Apply one request; true when it changed the present snapshot
    pub fn dispatch(&mut self, request: WorkflowRequest) -> bool {
        let edit = match request {
            WorkflowRequest::AddNode {
                parent_id,
                slot,
                kind,
            } => EditRequest::AddNode {
                parent_id,
                slot,
                kind,
            },
            WorkflowRequest::DeleteNode { node_id } => EditRequest::DeleteNode { node_id },
            WorkflowRequest::UpdateLabel { node_id, label } => {
                EditRequest::UpdateLabel { node_id, label }
            }
            WorkflowRequest::LoadTree { tree } => EditRequest::LoadTree { tree },
            WorkflowRequest::Undo => return self.history.undo(),
            WorkflowRequest::Redo => return self.history.redo(),
        };
        self.history.apply(&edit, self.ids.as_mut())
    }

    /// Insert a new node into `slot` of `parent_id`
    pub fn add_node(&mut self, parent_id: &str, slot: usize, kind: NodeKind) -> bool {
        self.dispatch(WorkflowRequest::AddNode {
            parent_id: parent_id.to_string(),
            slot,
            kind,
        })
    }

    /// Remove a node, promoting its first live child
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.dispatch(WorkflowRequest::DeleteNode {
            node_id: node_id.to_string(),
        })
    }

    /// Replace a node's display label
    pub fn update_label(&mut self, node_id: &str, label: &str) -> bool {
        self.dispatch(WorkflowRequest::UpdateLabel {
            node_id: node_id.to_string(),
            label: label.to_string(),
        })
    }

    /// Replace the whole tree; always recorded in history
    pub fn load_tree(&mut self, tree: WorkflowTree) -> bool {
        self.dispatch(WorkflowRequest::LoadTree { tree })
    }

    /// Step back one snapshot; false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    /// Step forward one snapshot; false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Whether an undo would change the present
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo would change the present
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serialize the present snapshot via the configured serializer
    ///
    /// The explicit external save trigger; reading the tree records
    /// nothing in history.
    pub fn save(&self) -> Result<String> {
        let text = self.serializer.serialize(self.history.present())?;
        log::info!(
            "saved workflow snapshot ({} nodes, {} bytes)",
            self.history.present().len(),
            text.len()
        );
        Ok(text)
    }

    /// Parse saved text and adopt it as the present snapshot
    ///
    /// Always records history, like any other whole-tree replacement.
    pub fn import(&mut self, text: &str) -> Result<()> {
        let tree = self.serializer.deserialize(text)?;
        log::info!("importing workflow snapshot ({} nodes)", tree.len());
        self.load_tree(tree);
        Ok(())
    }

    /// Structural invariant check of the present snapshot
    pub fn validate(&self) -> Vec<TreeViolation> {
        validate_tree(self.history.present())
    }
}
