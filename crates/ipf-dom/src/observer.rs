//! Mutation Observer
//!
//! Observers are registered on the tree; each mutation is queued as a
//! record on every observer whose options cover it. Records are drained by
//! the owner with `DomTree::take_records`.

use crate::NodeId;

/// Handle to a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value,
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Default::default()
        }
    }
}

/// Mutation observer
#[derive(Debug)]
pub(crate) struct MutationObserver {
    pub(crate) id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
    records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub(crate) fn new(id: ObserverId, target: NodeId, options: MutationObserverInit) -> Self {
        Self {
            id,
            target,
            options,
            records: Vec::new(),
        }
    }

    /// Whether a mutation falls under this observer's options
    ///
    /// `is_ancestor(a)` must report whether `a` is an inclusive ancestor of
    /// the record's target.
    pub(crate) fn wants(&self, record: &MutationRecord, is_ancestor: impl Fn(NodeId) -> bool) -> bool {
        let matches_type = match record.mutation_type {
            MutationType::Attributes => self.options.attributes,
            MutationType::CharacterData => self.options.character_data,
            MutationType::ChildList => self.options.child_list,
        };
        if !matches_type {
            return false;
        }

        let passes_filter = match (&self.options.attribute_filter, &record.attribute_name) {
            (Some(filter), Some(name)) => filter.iter().any(|f| f.eq_ignore_ascii_case(name)),
            _ => true,
        };
        if !passes_filter {
            return false;
        }

        record.target == self.target || (self.options.subtree && is_ancestor(self.target))
    }

    pub(crate) fn push(&mut self, mut record: MutationRecord) {
        if record.mutation_type == MutationType::Attributes && !self.options.attribute_old_value {
            record.old_value = None;
        }
        self.records.push(record);
    }

    pub(crate) fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_type_filter() {
        let observer = MutationObserver::new(ObserverId(1), NodeId(1), MutationObserverInit::child_list_subtree());

        let child_list = MutationRecord::child_list(NodeId(1), vec![NodeId(2)], Vec::new());
        let attr = MutationRecord::attributes(NodeId(1), "class", None);

        assert!(observer.wants(&child_list, |_| true));
        assert!(!observer.wants(&attr, |_| true));
    }

    #[test]
    fn test_observer_subtree() {
        let shallow = MutationObserver::new(
            ObserverId(1),
            NodeId(1),
            MutationObserverInit {
                child_list: true,
                ..Default::default()
            },
        );
        let deep = MutationObserver::new(ObserverId(2), NodeId(1), MutationObserverInit::child_list_subtree());

        let record = MutationRecord::child_list(NodeId(5), vec![NodeId(6)], Vec::new());
        assert!(!shallow.wants(&record, |_| true));
        assert!(deep.wants(&record, |a| a == NodeId(1)));
        assert!(!deep.wants(&record, |_| false));
    }

    #[test]
    fn test_attribute_filter_and_old_value() {
        let mut observer = MutationObserver::new(
            ObserverId(1),
            NodeId(1),
            MutationObserverInit {
                attributes: true,
                attribute_filter: Some(vec!["class".to_string()]),
                ..Default::default()
            },
        );

        let class = MutationRecord::attributes(NodeId(1), "class", Some("old".to_string()));
        let id = MutationRecord::attributes(NodeId(1), "id", None);
        assert!(observer.wants(&class, |_| true));
        assert!(!observer.wants(&id, |_| true));

        observer.push(class);
        let records = observer.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_value, None);
        assert!(!observer.has_pending());
    }
}
