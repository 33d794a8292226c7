//! Borrowed element handle for selector matching

use crate::{DomTree, ElementData, NodeId};

/// An element node borrowed from a tree
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    /// Wrap a node; `None` if it is not an element
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        let data = tree.get(id)?.as_element()?;
        Some(Self { tree, id, data })
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &'a ElementData {
        self.data
    }

    fn sibling_element(&self, forward: bool) -> Option<Self> {
        let mut current = self.tree.get(self.id)?;
        loop {
            let next = if forward {
                current.next_sibling
            } else {
                current.prev_sibling
            };
            if !next.is_valid() {
                return None;
            }
            if let Some(element) = Self::new(self.tree, next) {
                return Some(element);
            }
            current = self.tree.get(next)?;
        }
    }
}

impl<'a> ipf_css::Element for ElementRef<'a> {
    fn parent_element(&self) -> Option<Self> {
        Self::new(self.tree, self.tree.parent(self.id)?)
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(false)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(true)
    }

    fn local_name(&self) -> &str {
        &self.data.local_name
    }

    fn id(&self) -> Option<&str> {
        self.data.id()
    }

    fn has_class(&self, name: &str) -> bool {
        self.data.has_class(name)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.data.get_attr(name)
    }

    fn is_root(&self) -> bool {
        self.tree.parent(self.id) == Some(NodeId::ROOT)
    }
}
