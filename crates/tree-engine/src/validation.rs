//! Structural invariant checks for workflow trees
//!
//! The engine's own mutations never produce a violating tree; these
//! checks exist for trees that arrive from outside (imports, host-built
//! values) and for tests.

use std::collections::HashMap;

use crate::types::{NodeId, NodeKind, WorkflowTree};

/// A structural invariant violation with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    /// `root_id` is not a key of the node arena
    MissingRoot { root_id: NodeId },
    /// The root node is not a start node
    RootNotStart { root_id: NodeId, kind: NodeKind },
    /// A node's slot count disagrees with its kind's arity
    ArityMismatch {
        node_id: NodeId,
        kind: NodeKind,
        expected: usize,
        actual: usize,
    },
    /// A slot references an id with no resident node
    DanglingChild {
        node_id: NodeId,
        slot: usize,
        child_id: NodeId,
    },
    /// An id is held by more than one slot
    ChildInMultipleSlots { child_id: NodeId },
    /// An arena key disagrees with the id stored on its node
    KeyIdMismatch { key: NodeId, id: NodeId },
}

impl std::fmt::Display for TreeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRoot { root_id } => {
                write!(f, "Root id '{}' has no resident node", root_id)
            }
            Self::RootNotStart { root_id, kind } => {
                write!(f, "Root node '{}' has kind {:?}, expected start", root_id, kind)
            }
            Self::ArityMismatch {
                node_id,
                kind,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Node '{}' ({:?}) has {} slots, expected {}",
                    node_id, kind, actual, expected
                )
            }
            Self::DanglingChild {
                node_id,
                slot,
                child_id,
            } => {
                write!(
                    f,
                    "Slot {} of node '{}' references missing node '{}'",
                    slot, node_id, child_id
                )
            }
            Self::ChildInMultipleSlots { child_id } => {
                write!(f, "Node '{}' is held by more than one slot", child_id)
            }
            Self::KeyIdMismatch { key, id } => {
                write!(f, "Arena key '{}' holds a node with id '{}'", key, id)
            }
        }
    }
}

impl std::error::Error for TreeViolation {}

/// Check every structural invariant of a tree
///
/// Returns all violations found (not just the first). An empty vector
/// means the tree is structurally valid; orphans are not violations.
pub fn validate_tree(tree: &WorkflowTree) -> Vec<TreeViolation> {
    let mut violations = Vec::new();

    match tree.node(&tree.root_id) {
        None => violations.push(TreeViolation::MissingRoot {
            root_id: tree.root_id.clone(),
        }),
        Some(root) if root.kind != NodeKind::Start => {
            violations.push(TreeViolation::RootNotStart {
                root_id: tree.root_id.clone(),
                kind: root.kind,
            });
        }
        Some(_) => {}
    }

    let mut holders: HashMap<&str, usize> = HashMap::new();
    for (key, node) in &tree.nodes {
        if *key != node.id {
            violations.push(TreeViolation::KeyIdMismatch {
                key: key.clone(),
                id: node.id.clone(),
            });
        }
        let expected = node.kind.arity();
        if node.children.len() != expected {
            violations.push(TreeViolation::ArityMismatch {
                node_id: node.id.clone(),
                kind: node.kind,
                expected,
                actual: node.children.len(),
            });
        }
        for (slot, child) in node.children.iter().enumerate() {
            let Some(child_id) = child else { continue };
            if !tree.contains(child_id) {
                violations.push(TreeViolation::DanglingChild {
                    node_id: node.id.clone(),
                    slot,
                    child_id: child_id.clone(),
                });
            }
            *holders.entry(child_id.as_str()).or_insert(0) += 1;
        }
    }

    let mut doubly_held: Vec<&str> = holders
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect();
    doubly_held.sort_unstable();
    for child_id in doubly_held {
        violations.push(TreeViolation::ChildInMultipleSlots {
            child_id: child_id.to_string(),
        });
    }

    violations
}
