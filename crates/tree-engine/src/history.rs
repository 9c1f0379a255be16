//! Linear undo/redo history over immutable snapshots
//!
//! # Design Choice: Snapshots vs Command Pattern
//!
//! History is kept as whole-tree snapshots instead of invertible
//! commands:
//! - No need to implement an inverse for every mutation
//! - Works with any edit, including whole-tree replacement
//! - Copy-on-write sharing keeps a snapshot to the handful of records
//!   the edit touched
//! - Simple to understand and debug
//!
//! The stack has three parts: `past` (oldest to newest), the `present`
//! snapshot readers render from, and `future` (nearest to farthest,
//! populated by undo). Undo and redo bypass the mutation engine and move
//! snapshots between the three parts directly.

use std::collections::VecDeque;

use ramify_identity::IdentifierSource;

use crate::mutation::{self, EditRequest};
use crate::types::WorkflowTree;

/// Undo/redo state machine over `{past, present, future}`
///
/// Owns its three sequences exclusively; callers only ever read
/// [`present`](Self::present). Neither stack is bounded — snapshots
/// accumulate until the history itself is dropped.
pub struct WorkflowHistory {
    past: Vec<WorkflowTree>,
    present: WorkflowTree,
    future: VecDeque<WorkflowTree>,
}

impl WorkflowHistory {
    /// Start a history at `initial` with nothing to undo or redo
    pub fn new(initial: WorkflowTree) -> Self {
        Self {
            past: Vec::new(),
            present: initial,
            future: VecDeque::new(),
        }
    }

    /// The snapshot readers render from
    pub fn present(&self) -> &WorkflowTree {
        &self.present
    }

    /// Run `edit` through the mutation engine against the present
    /// snapshot
    ///
    /// When the edit applies, the old present is retired into `past`,
    /// the new snapshot is installed, and all redo entries are
    /// discarded; returns true. An inapplicable edit records nothing and
    /// returns false. `LoadTree` always applies — an explicit external
    /// replacement is recorded even when the loaded tree is value-equal
    /// to the current one.
    pub fn apply(&mut self, edit: &EditRequest, ids: &mut dyn IdentifierSource) -> bool {
        match mutation::apply_edit(&self.present, edit, ids) {
            Some(next) => {
                let retired = std::mem::replace(&mut self.present, next);
                self.past.push(retired);
                self.future.clear();
                true
            }
            None => false,
        }
    }

    /// Step back one snapshot; false when the past is empty
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one snapshot; false when the future is empty
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    /// Whether an undo would change the present
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo would change the present
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of snapshots retired into the past
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of undone snapshots waiting for redo
    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, WorkflowTree};
    use ramify_identity::SequentialIds;

    fn fresh() -> (WorkflowHistory, SequentialIds) {
        (
            WorkflowHistory::new(WorkflowTree::new("start-1")),
            SequentialIds::default(),
        )
    }

    fn add(parent: &str, slot: usize, kind: NodeKind) -> EditRequest {
        EditRequest::AddNode {
            parent_id: parent.to_string(),
            slot,
            kind,
        }
    }

    #[test]
    fn test_apply_then_undo_then_redo_round_trip() {
        let (mut history, mut ids) = fresh();
        let before = history.present().clone();

        assert!(history.apply(&add("start-1", 0, NodeKind::Action), &mut ids));
        let after = history.present().clone();
        assert_ne!(before, after);

        assert!(history.undo());
        assert_eq!(*history.present(), before);

        assert!(history.redo());
        assert_eq!(*history.present(), after);
    }

    #[test]
    fn test_noop_records_nothing() {
        let (mut history, mut ids) = fresh();

        assert!(!history.apply(&add("ghost", 0, NodeKind::Action), &mut ids));
        assert!(!history.can_undo());
        assert_eq!(history.past_len(), 0);
    }

    #[test]
    fn test_apply_discards_redo_entries() {
        let (mut history, mut ids) = fresh();

        history.apply(&add("start-1", 0, NodeKind::Action), &mut ids);
        history.apply(&add("node-1", 0, NodeKind::Action), &mut ids);
        history.undo();
        assert!(history.can_redo());

        history.apply(&add("node-1", 0, NodeKind::Branch), &mut ids);
        assert!(!history.can_redo());
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_undo_redo_exhaustion() {
        let (mut history, mut ids) = fresh();

        assert!(!history.undo());
        assert!(!history.redo());

        history.apply(&add("start-1", 0, NodeKind::Action), &mut ids);
        assert!(history.undo());
        assert!(!history.undo());
        assert!(history.redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_can_undo_redo_transitions() {
        let (mut history, mut ids) = fresh();

        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.apply(&add("start-1", 0, NodeKind::Action), &mut ids);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo();
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_multi_step_undo_restores_each_state() {
        let (mut history, mut ids) = fresh();
        let initial = history.present().clone();

        history.apply(&add("start-1", 0, NodeKind::Action), &mut ids);
        let one = history.present().clone();
        history.apply(&add("node-1", 0, NodeKind::Branch), &mut ids);

        assert!(history.undo());
        assert_eq!(*history.present(), one);
        assert!(history.undo());
        assert_eq!(*history.present(), initial);
        assert_eq!(history.future_len(), 2);
    }

    #[test]
    fn test_load_tree_always_records() {
        let (mut history, mut ids) = fresh();
        let same = history.present().clone();

        // Value-equal replacement still lands in history: it represents
        // an explicit external replacement, not an engine no-op.
        assert!(history.apply(&EditRequest::LoadTree { tree: same }, &mut ids));
        assert!(history.can_undo());
        assert_eq!(history.past_len(), 1);
    }

    #[test]
    fn test_undo_survives_later_mutations_structurally() {
        let (mut history, mut ids) = fresh();

        history.apply(&add("start-1", 0, NodeKind::Action), &mut ids);
        history.apply(&add("node-1", 0, NodeKind::Action), &mut ids);
        history.apply(&EditRequest::DeleteNode {
            node_id: "node-1".to_string(),
        }, &mut ids);

        // Walk all the way back; every intermediate state is intact.
        assert!(history.undo());
        assert!(history.present().contains("node-1"));
        assert!(history.undo());
        assert!(!history.present().contains("node-2"));
        assert!(history.undo());
        assert_eq!(history.present().len(), 1);
    }
}
