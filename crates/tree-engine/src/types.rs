//! Core types for workflow trees
//!
//! A workflow tree is an arena of typed nodes keyed by id, with a single
//! `start` root. Child links live in fixed-arity slot vectors on each
//! node; a derived parent index maps every held child back to the slot
//! holding it so deletes never scan the arena.
//!
//! Trees are snapshot values: mutations build a new tree and share every
//! untouched node record with the previous one via `Arc`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unique identifier for a node
pub type NodeId = String;

/// The kind of a workflow step
///
/// The kind fixes the node's slot count (arity) for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point; exactly one per tree, created with the tree
    Start,
    /// A single step with one outgoing slot
    Action,
    /// A conditional with a true slot (0) and a false slot (1)
    Branch,
    /// Terminal step with no outgoing slots
    End,
}

impl NodeKind {
    /// Number of child slots a node of this kind always carries
    pub fn arity(self) -> usize {
        match self {
            NodeKind::Start | NodeKind::Action => 1,
            NodeKind::Branch => 2,
            NodeKind::End => 0,
        }
    }

    /// Display label given to newly inserted nodes of this kind
    ///
    /// # Panics
    ///
    /// Panics for [`NodeKind::Start`]: a tree receives its single start
    /// node at construction and never inserts another, so asking for a
    /// start template is an internal defect, not bad user input.
    pub fn template_label(self) -> &'static str {
        match self {
            NodeKind::Action => "Action",
            NodeKind::Branch => "Condition",
            NodeKind::End => "End",
            NodeKind::Start => panic!("no insertion template exists for start nodes"),
        }
    }
}

/// A single step in a workflow tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    /// Unique identifier, immutable once created
    pub id: NodeId,
    /// Step kind; fixes the slot count
    pub kind: NodeKind,
    /// Free-text display label
    pub label: String,
    /// Ordered child slots; `None` marks an empty slot.
    ///
    /// `children.len()` always equals `kind.arity()`. For branches,
    /// slot 0 is the true path and slot 1 the false path.
    pub children: Vec<Option<NodeId>>,
}

impl WorkflowNode {
    /// Build a fresh node of `kind` with its template label and all
    /// slots empty.
    ///
    /// # Panics
    ///
    /// Panics for [`NodeKind::Start`]; see [`NodeKind::template_label`].
    pub fn template(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: kind.template_label().to_string(),
            children: vec![None; kind.arity()],
        }
    }

    /// Id in the first non-empty slot, scanned left to right
    pub fn first_live_child(&self) -> Option<&NodeId> {
        self.children.iter().flatten().next()
    }
}

/// Back-reference from a held child to the slot holding it
///
/// A relation only, never an ownership edge: dropping a link orphans the
/// child, it does not free it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// Node whose slot holds the child
    pub parent_id: NodeId,
    /// Index of that slot in the parent's children
    pub slot: usize,
}

/// A complete workflow tree snapshot
///
/// Nodes are held behind `Arc` so consecutive snapshots share every
/// record a mutation did not touch. Nodes may be resident without being
/// reachable from the root ("orphans"); that is allowed, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTree {
    /// All resident nodes, reachable or not, keyed by id
    pub nodes: HashMap<NodeId, Arc<WorkflowNode>>,
    /// Id of the single start node
    pub root_id: NodeId,
    /// Child id → holding slot, kept current by every mutation.
    ///
    /// Derived state: rebuilt after deserialization, excluded from
    /// equality.
    #[serde(skip)]
    pub(crate) parents: HashMap<NodeId, ParentLink>,
}

impl PartialEq for WorkflowTree {
    fn eq(&self, other: &Self) -> bool {
        self.root_id == other.root_id && self.nodes == other.nodes
    }
}

impl WorkflowTree {
    /// Create a tree holding a single start node with one empty slot
    pub fn new(root_id: impl Into<NodeId>) -> Self {
        let root_id = root_id.into();
        let root = WorkflowNode {
            id: root_id.clone(),
            kind: NodeKind::Start,
            label: "Start".to_string(),
            children: vec![None],
        };
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), Arc::new(root));
        Self {
            nodes,
            root_id,
            parents: HashMap::new(),
        }
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    /// Whether a node with this id is resident
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Slot currently holding `id`
    ///
    /// `None` for the root and for orphan subtree roots — nothing holds
    /// them.
    pub fn parent_of(&self, id: &str) -> Option<&ParentLink> {
        self.parents.get(id)
    }

    /// Number of resident nodes, orphans included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes at all
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids reachable from the root by following non-empty slots
    pub fn reachable_ids(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        if self.nodes.contains_key(&self.root_id) {
            seen.insert(self.root_id.clone());
            queue.push_back(self.root_id.clone());
        }
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for child in node.children.iter().flatten() {
                if self.nodes.contains_key(child) && seen.insert(child.clone()) {
                    queue.push_back(child.clone());
                }
            }
        }
        seen
    }

    /// Resident nodes not reachable from the root
    ///
    /// The engine never prunes these; the listing exists so a host can
    /// layer its own eviction policy on top.
    pub fn orphan_ids(&self) -> Vec<NodeId> {
        let reachable = self.reachable_ids();
        let mut orphans: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect();
        orphans.sort();
        orphans
    }

    /// Recompute the parent index from the child slots
    ///
    /// Needed after a tree arrives from outside the engine (deserialized
    /// or host-built); mutations keep the index current incrementally.
    pub fn reindex_parents(&mut self) {
        self.parents.clear();
        for node in self.nodes.values() {
            for (slot, child) in node.children.iter().enumerate() {
                if let Some(child_id) = child {
                    self.parents.insert(
                        child_id.clone(),
                        ParentLink {
                            parent_id: node.id.clone(),
                            slot,
                        },
                    );
                }
            }
        }
    }

    /// Serialize to the canonical JSON snapshot form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore from the JSON snapshot form, rebuilding the parent index
    pub fn from_json(text: &str) -> Result<Self> {
        let mut tree: WorkflowTree = serde_json::from_str(text)?;
        tree.reindex_parents();
        Ok(tree)
    }
}
