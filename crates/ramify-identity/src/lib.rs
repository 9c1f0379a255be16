//! Node identifier allocation for Ramify workflows
//!
//! Every node in a workflow tree is keyed by a string id that must stay
//! unique for the lifetime of the process — ids live on in undo history
//! after the node itself is deleted, so a source must never reissue one.
//!
//! Two implementations are provided: [`SequentialIds`] for readable,
//! deterministic ids (the default for new workflows and for tests) and
//! [`UuidIds`] for ids that also stay unique across process restarts.

/// Source of workflow node identifiers.
///
/// Contract: `next_id` never returns an id it has already handed out
/// during this process's lifetime. Nothing else about the id is
/// specified; callers treat it as an opaque string.
pub trait IdentifierSource {
    /// Allocate a fresh identifier.
    fn next_id(&mut self) -> String;
}

/// Prefix-counter identifiers: `node-1`, `node-2`, ...
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Create a source issuing `{prefix}-1`, `{prefix}-2`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdentifierSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Random v4 UUID identifiers.
///
/// Use when saved workflows are re-opened and extended in later sessions;
/// a counter source would restart at 1 and collide with persisted ids.
#[derive(Default)]
pub struct UuidIds;

impl IdentifierSource for UuidIds {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_unique_and_prefixed() {
        let mut ids = SequentialIds::new("step");
        assert_eq!(ids.next_id(), "step-1");
        assert_eq!(ids.next_id(), "step-2");
        assert_eq!(ids.next_id(), "step-3");
    }

    #[test]
    fn test_default_prefix() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), "node-1");
    }

    #[test]
    fn test_uuid_ids_differ() {
        let mut ids = UuidIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }
}
