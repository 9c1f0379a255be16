//! Pure tree mutations
//!
//! Every function here takes the current snapshot by reference and
//! returns `Some(next snapshot)` or `None` when the request does not
//! apply. `None` is not an error: referencing a missing node, an
//! out-of-range slot, or the root in a delete all resolve to a silent
//! no-op, leaving tree and history untouched. The caller never sees a
//! half-applied edit.
//!
//! Mutations are copy-on-write over the node arena: the touched records
//! and the top-level maps are re-allocated, everything else is shared
//! with the previous snapshot.

use std::sync::Arc;

use ramify_identity::IdentifierSource;
use serde::{Deserialize, Serialize};

use crate::types::{NodeId, NodeKind, ParentLink, WorkflowNode, WorkflowTree};

/// An edit request issued against the current snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditRequest {
    /// Insert a new node into `slot` of `parent_id`, relinking any
    /// occupant under the new node
    #[serde(rename_all = "camelCase")]
    AddNode {
        parent_id: NodeId,
        slot: usize,
        kind: NodeKind,
    },
    /// Remove a node, promoting its first live child into the vacated
    /// slot
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: NodeId },
    /// Replace a node's display label
    #[serde(rename_all = "camelCase")]
    UpdateLabel { node_id: NodeId, label: String },
    /// Replace the whole tree (import/restore)
    #[serde(rename_all = "camelCase")]
    LoadTree { tree: WorkflowTree },
}

/// Compute the next snapshot for `edit`, or `None` when inapplicable
pub fn apply_edit(
    tree: &WorkflowTree,
    edit: &EditRequest,
    ids: &mut dyn IdentifierSource,
) -> Option<WorkflowTree> {
    match edit {
        EditRequest::AddNode {
            parent_id,
            slot,
            kind,
        } => add_node(tree, parent_id, *slot, *kind, ids),
        EditRequest::DeleteNode { node_id } => delete_node(tree, node_id),
        EditRequest::UpdateLabel { node_id, label } => update_label(tree, node_id, label),
        EditRequest::LoadTree { tree: next } => Some(load_tree(next)),
    }
}

/// Insert a freshly templated `kind` node into `slot` of `parent_id`
///
/// If the slot already holds a subtree, that subtree is relinked into the
/// new node's first slot — not duplicated, not deleted. A zero-slot node
/// (`end`) cannot hold it; the occupant then stays resident as an orphan.
///
/// # Panics
///
/// Panics when `kind` is [`NodeKind::Start`]; see
/// [`NodeKind::template_label`].
pub fn add_node(
    tree: &WorkflowTree,
    parent_id: &str,
    slot: usize,
    kind: NodeKind,
    ids: &mut dyn IdentifierSource,
) -> Option<WorkflowTree> {
    let Some(parent) = tree.node(parent_id) else {
        log::debug!("add_node: unknown parent '{parent_id}', ignoring");
        return None;
    };
    if slot >= parent.children.len() {
        log::debug!(
            "add_node: slot {slot} out of range for '{parent_id}' (arity {}), ignoring",
            parent.children.len()
        );
        return None;
    }

    let new_id = ids.next_id();
    let mut node = WorkflowNode::template(new_id.clone(), kind);

    let occupant = parent.children[slot].clone();
    if let Some(occupant_id) = &occupant {
        if let Some(first) = node.children.first_mut() {
            *first = Some(occupant_id.clone());
        }
    }

    let mut nodes = tree.nodes.clone();
    let mut patched_parent = parent.clone();
    patched_parent.children[slot] = Some(new_id.clone());
    nodes.insert(parent_id.to_string(), Arc::new(patched_parent));
    nodes.insert(new_id.clone(), Arc::new(node));

    let mut parents = tree.parents.clone();
    parents.insert(
        new_id.clone(),
        ParentLink {
            parent_id: parent_id.to_string(),
            slot,
        },
    );
    if let Some(occupant_id) = occupant {
        if kind.arity() > 0 {
            parents.insert(
                occupant_id,
                ParentLink {
                    parent_id: new_id,
                    slot: 0,
                },
            );
        } else {
            // The occupant subtree just became an orphan root.
            parents.remove(&occupant_id);
        }
    }

    Some(WorkflowTree {
        nodes,
        root_id: tree.root_id.clone(),
        parents,
    })
}

/// Remove `node_id`, contracting the chain through it
///
/// The parent's slot that held the node is pointed at the node's first
/// live child ("successor promotion"), or emptied when it has none. Any
/// remaining children stay resident as orphans.
pub fn delete_node(tree: &WorkflowTree, node_id: &str) -> Option<WorkflowTree> {
    if node_id == tree.root_id {
        log::debug!("delete_node: refusing to delete the root, ignoring");
        return None;
    }
    let Some(link) = tree.parent_of(node_id).cloned() else {
        log::debug!("delete_node: no slot holds '{node_id}', ignoring");
        return None;
    };
    let node = tree.node(node_id)?.clone();

    let successor = node.first_live_child().cloned();

    let mut nodes = tree.nodes.clone();
    let mut patched_parent = tree.node(&link.parent_id)?.clone();
    patched_parent.children[link.slot] = successor;
    nodes.insert(link.parent_id.clone(), Arc::new(patched_parent));
    nodes.remove(node_id);

    let mut parents = tree.parents.clone();
    parents.remove(node_id);
    let mut live = node.children.iter().flatten();
    if let Some(promoted) = live.next() {
        parents.insert(promoted.clone(), link);
    }
    // Non-promoted children become orphan roots.
    for orphaned in live {
        parents.remove(orphaned);
    }

    Some(WorkflowTree {
        nodes,
        root_id: tree.root_id.clone(),
        parents,
    })
}

/// Replace the display label of `node_id`
///
/// Applicable whenever the node exists, even for an identical label; the
/// caller decides whether an edit is worth issuing, the engine does not
/// second-guess it.
pub fn update_label(tree: &WorkflowTree, node_id: &str, label: &str) -> Option<WorkflowTree> {
    let Some(node) = tree.node(node_id) else {
        log::debug!("update_label: unknown node '{node_id}', ignoring");
        return None;
    };

    let mut patched = node.clone();
    patched.label = label.to_string();

    let mut nodes = tree.nodes.clone();
    nodes.insert(node_id.to_string(), Arc::new(patched));

    Some(WorkflowTree {
        nodes,
        root_id: tree.root_id.clone(),
        parents: tree.parents.clone(),
    })
}

/// Adopt an externally supplied tree, rebuilding its parent index
fn load_tree(next: &WorkflowTree) -> WorkflowTree {
    let mut adopted = next.clone();
    adopted.reindex_parents();
    adopted
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramify_identity::SequentialIds;

    fn start_tree() -> (WorkflowTree, SequentialIds) {
        (WorkflowTree::new("start-1"), SequentialIds::default())
    }

    fn child_of<'t>(tree: &'t WorkflowTree, parent: &str, slot: usize) -> Option<&'t str> {
        tree.node(parent).unwrap().children[slot].as_deref()
    }

    #[test]
    fn test_add_into_empty_slot() {
        let (tree, mut ids) = start_tree();

        let next = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-1"));
        let added = next.node("node-1").unwrap();
        assert_eq!(added.kind, NodeKind::Action);
        assert_eq!(added.label, "Action");
        assert_eq!(added.children, vec![None]);
        assert_eq!(next.parent_of("node-1").unwrap().parent_id, "start-1");
        // The input snapshot is untouched.
        assert_eq!(child_of(&tree, "start-1", 0), None);
    }

    #[test]
    fn test_add_relinks_occupant_under_new_node() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();

        // Insert a branch between the start node and the action.
        let next = add_node(&tree, "start-1", 0, NodeKind::Branch, &mut ids).unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-2"));
        let branch = next.node("node-2").unwrap();
        assert_eq!(branch.children, vec![Some("node-1".to_string()), None]);
        let relinked = next.parent_of("node-1").unwrap();
        assert_eq!(relinked.parent_id, "node-2");
        assert_eq!(relinked.slot, 0);
    }

    #[test]
    fn test_add_end_orphans_occupant() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();

        let next = add_node(&tree, "start-1", 0, NodeKind::End, &mut ids).unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-2"));
        assert!(next.node("node-2").unwrap().children.is_empty());
        // The action is dropped from the tree but stays resident.
        assert!(next.contains("node-1"));
        assert!(next.parent_of("node-1").is_none());
        assert_eq!(next.orphan_ids(), vec!["node-1".to_string()]);
    }

    #[test]
    fn test_add_rejects_unknown_parent_and_bad_slot() {
        let (tree, mut ids) = start_tree();

        assert!(add_node(&tree, "ghost", 0, NodeKind::Action, &mut ids).is_none());
        assert!(add_node(&tree, "start-1", 1, NodeKind::Action, &mut ids).is_none());

        // Rejected requests never consume an id, so the end node is
        // node-1.
        let with_end = add_node(&tree, "start-1", 0, NodeKind::End, &mut ids).unwrap();
        assert!(with_end.contains("node-1"));
        // An end node has no slots at all.
        assert!(add_node(&with_end, "node-1", 0, NodeKind::Action, &mut ids).is_none());
    }

    #[test]
    fn test_delete_leaf_empties_slot() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 0, NodeKind::Branch, &mut ids).unwrap();

        let next = delete_node(&tree, "node-2").unwrap();

        assert_eq!(child_of(&next, "node-1", 0), None);
        assert!(!next.contains("node-2"));
    }

    #[test]
    fn test_delete_contracts_chain() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 0, NodeKind::Action, &mut ids).unwrap();

        // start -> node-1 -> node-2; deleting node-1 reattaches node-2.
        let next = delete_node(&tree, "node-1").unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-2"));
        assert!(!next.contains("node-1"));
        let promoted = next.parent_of("node-2").unwrap();
        assert_eq!(promoted.parent_id, "start-1");
        assert_eq!(promoted.slot, 0);
    }

    #[test]
    fn test_delete_branch_promotes_first_child_orphans_second() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Branch, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 0, NodeKind::Action, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 1, NodeKind::Action, &mut ids).unwrap();

        let next = delete_node(&tree, "node-1").unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-2"));
        assert!(next.contains("node-3"));
        assert!(next.parent_of("node-3").is_none());
        assert_eq!(next.orphan_ids(), vec!["node-3".to_string()]);
    }

    #[test]
    fn test_delete_branch_with_only_false_child_promotes_it() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Branch, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 1, NodeKind::Action, &mut ids).unwrap();

        // Slot 0 is empty; the first live child is in slot 1.
        let next = delete_node(&tree, "node-1").unwrap();

        assert_eq!(child_of(&next, "start-1", 0), Some("node-2"));
        assert!(next.orphan_ids().is_empty());
    }

    #[test]
    fn test_delete_root_is_noop() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();

        assert!(delete_node(&tree, "start-1").is_none());
        assert!(delete_node(&tree, "ghost").is_none());
    }

    #[test]
    fn test_delete_inside_orphan_subtree_still_applies() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 0, NodeKind::Action, &mut ids).unwrap();
        // Orphan the node-1 -> node-2 chain.
        let tree = add_node(&tree, "start-1", 0, NodeKind::End, &mut ids).unwrap();
        assert!(tree.parent_of("node-1").is_none());

        // node-2 is still held by a slot of the orphaned node-1.
        let next = delete_node(&tree, "node-2").unwrap();
        assert!(!next.contains("node-2"));
        assert_eq!(next.node("node-1").unwrap().children, vec![None]);

        // The orphan root itself has no holding slot, so it cannot be
        // deleted.
        assert!(delete_node(&next, "node-1").is_none());
    }

    #[test]
    fn test_update_label() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();

        let next = update_label(&tree, "node-1", "Send email").unwrap();

        assert_eq!(next.node("node-1").unwrap().label, "Send email");
        assert_eq!(next.node("node-1").unwrap().kind, NodeKind::Action);
        assert_eq!(tree.node("node-1").unwrap().label, "Action");
        assert!(update_label(&tree, "ghost", "x").is_none());
    }

    #[test]
    fn test_untouched_records_are_shared() {
        let (tree, mut ids) = start_tree();
        let tree = add_node(&tree, "start-1", 0, NodeKind::Action, &mut ids).unwrap();
        let tree = add_node(&tree, "node-1", 0, NodeKind::Action, &mut ids).unwrap();

        let next = update_label(&tree, "node-2", "renamed").unwrap();

        // Only the renamed record was re-allocated.
        assert!(Arc::ptr_eq(&tree.nodes["start-1"], &next.nodes["start-1"]));
        assert!(Arc::ptr_eq(&tree.nodes["node-1"], &next.nodes["node-1"]));
        assert!(!Arc::ptr_eq(&tree.nodes["node-2"], &next.nodes["node-2"]));
    }

    #[test]
    fn test_load_tree_rebuilds_index() {
        let (tree, mut ids) = start_tree();
        let donor = {
            let t = WorkflowTree::new("start-9");
            let mut ids9 = SequentialIds::new("imported");
            add_node(&t, "start-9", 0, NodeKind::Action, &mut ids9).unwrap()
        };
        let mut stripped = donor.clone();
        stripped.parents.clear();

        let next = apply_edit(
            &tree,
            &EditRequest::LoadTree { tree: stripped },
            &mut ids,
        )
        .unwrap();

        assert_eq!(next, donor);
        assert_eq!(next.parent_of("imported-1").unwrap().parent_id, "start-9");
    }
}
