//! DOM Tree (arena-based allocation)

use crate::observer::MutationObserver;
use crate::{
    DomError, DomResult, MutationObserverInit, MutationRecord, Node, NodeData, NodeId, ObserverId,
};

/// Arena-based DOM tree
///
/// Node 0 is always the document node. Removed nodes are only unlinked,
/// never freed, so a stale `NodeId` still resolves to its (detached) node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    observers: Vec<MutationObserver>,
    next_observer_id: u32,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.alloc(Node::element(local_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.alloc(Node::comment(content.to_string()))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Parent of a node, if attached to one
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next: first }
    }

    /// Descendants of a node in document (pre-)order, excluding the node
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants {
            tree: self,
            start: id,
            next: first,
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`
    ///
    /// A child that already has a parent is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insert(parent, child, reference)?;
        if reference == Some(child) {
            return Ok(child);
        }

        if self.parent(child).is_some() {
            self.unlink(child);
        }

        let next = reference.unwrap_or(NodeId::NONE);
        let prev = match reference {
            Some(r) => self.nodes[r.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        self.queue_mutation(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(child)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;

        if !parent_node.is_container() || child == NodeId::ROOT || self.contains(child, parent) {
            tracing::trace!("Rejected insertion of {:?} under {:?}", child, parent);
            return Err(DomError::HierarchyRequest);
        }
        if let Some(r) = reference {
            if self.node(r)?.parent != parent {
                return Err(DomError::NotAChild);
            }
        }
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if !parent.is_valid() || self.node(child)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.unlink(child);
        Ok(child)
    }

    /// Detach a node from its parent (`ChildNode.remove()`); no-op when detached
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        if self.node(id)?.parent.is_valid() {
            self.unlink(id);
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;

        self.queue_mutation(MutationRecord::child_list(parent, Vec::new(), vec![child]));
    }

    // ------------------------------------------------------------------
    // Attributes & character data
    // ------------------------------------------------------------------

    /// Read an attribute of an element
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self
            .get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        let old = element.set_attr(name, value);
        self.queue_mutation(MutationRecord::attributes(id, name, old));
        Ok(())
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let element = self
            .get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        match element.remove_attr(name) {
            Some(old) => {
                self.queue_mutation(MutationRecord::attributes(id, name, Some(old)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the contents of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        let NodeData::Text(text) = &mut node.data else {
            return Err(DomError::HierarchyRequest);
        };
        let old = std::mem::replace(text, content.to_string());
        self.queue_mutation(MutationRecord::character_data(id, Some(old)));
        Ok(())
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|(_, node)| node.as_text())
            .collect()
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Start observing mutations at `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push(MutationObserver::new(id, target, options));
        id
    }

    /// Drop an observer and its pending records
    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.retain(|o| o.id != observer);
    }

    /// Drain the records queued for an observer
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|o| o.id == observer)
            .map(|o| o.take_records())
            .unwrap_or_default()
    }

    /// Whether an observer has queued records
    pub fn has_pending_records(&self, observer: ObserverId) -> bool {
        self.observers
            .iter()
            .any(|o| o.id == observer && o.has_pending())
    }

    fn queue_mutation(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, o)| o.wants(&record, |a| self.contains(a, record.target)))
            .map(|(i, _)| i)
            .collect();
        for i in interested {
            self.observers[i].push(record.clone());
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    start: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut current = id;
            loop {
                if current == self.start {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(current) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                current = n.parent;
                if !current.is_valid() || current == self.start {
                    break NodeId::NONE;
                }
            }
        };

        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_children() {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html).unwrap();
        tree.append_child(html, head).unwrap();
        tree.append_child(html, body).unwrap();

        let children: Vec<NodeId> = tree.children(html).map(|(id, _)| id).collect();
        assert_eq!(children, vec![head, body]);
        assert_eq!(tree.parent(body), Some(html));
        assert!(tree.is_connected(body));
    }

    #[test]
    fn test_insert_before() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");

        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(NodeId::ROOT, c).unwrap();
        tree.insert_before(NodeId::ROOT, b, Some(c)).unwrap();

        let order: Vec<NodeId> = tree.children(NodeId::ROOT).map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        let text = tree.create_text("hi");

        tree.append_child(NodeId::ROOT, div).unwrap();
        tree.append_child(div, span).unwrap();

        assert_eq!(tree.append_child(span, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(div, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(text, span), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(div, NodeId::ROOT), Err(DomError::HierarchyRequest));
        assert_eq!(tree.remove_child(NodeId::ROOT, span), Err(DomError::NotAChild));
        assert_eq!(
            tree.insert_before(div, text, Some(div)),
            Err(DomError::NotAChild)
        );
    }

    #[test]
    fn test_detach_keeps_node_addressable() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let iframe = tree.create_element("iframe");
        tree.append_child(NodeId::ROOT, div).unwrap();
        tree.append_child(div, iframe).unwrap();

        tree.detach(div).unwrap();

        assert!(!tree.is_connected(div));
        assert!(!tree.is_connected(iframe));
        assert!(tree.get(iframe).is_some());
        assert_eq!(tree.parent(iframe), Some(div));
        assert!(tree.detach(div).is_ok());
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        let d = tree.create_element("d");
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(a, b).unwrap();
        tree.append_child(b, c).unwrap();
        tree.append_child(a, d).unwrap();

        let all: Vec<NodeId> = tree.descendants(NodeId::ROOT).map(|(id, _)| id).collect();
        assert_eq!(all, vec![a, b, c, d]);

        let under_b: Vec<NodeId> = tree.descendants(b).map(|(id, _)| id).collect();
        assert_eq!(under_b, vec![c]);
    }

    #[test]
    fn test_attribute_mutations() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let text = tree.create_text("x");

        tree.set_attribute(div, "data-ipf-hidden", "1").unwrap();
        assert_eq!(tree.get_attribute(div, "data-ipf-hidden"), Some("1"));
        assert_eq!(tree.remove_attribute(div, "data-ipf-hidden"), Ok(true));
        assert_eq!(tree.remove_attribute(div, "data-ipf-hidden"), Ok(false));
        assert_eq!(tree.set_attribute(text, "a", "b"), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn test_observer_records_child_list() {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        tree.append_child(NodeId::ROOT, html).unwrap();

        let observer = tree.observe(html, MutationObserverInit::child_list_subtree());

        let body = tree.create_element("body");
        let iframe = tree.create_element("iframe");
        tree.append_child(html, body).unwrap();
        tree.append_child(body, iframe).unwrap();
        tree.set_attribute(iframe, "src", "about:blank").unwrap();
        tree.detach(iframe).unwrap();

        let records = tree.take_records(observer);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].added_nodes, vec![body]);
        assert_eq!(records[1].target, body);
        assert_eq!(records[2].removed_nodes, vec![iframe]);
        assert!(!tree.has_pending_records(observer));

        // Mutations outside the observed subtree are not recorded
        let stray = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(stray, child).unwrap();
        assert!(!tree.has_pending_records(observer));

        tree.disconnect(observer);
        tree.append_child(html, stray).unwrap();
        assert!(tree.take_records(observer).is_empty());
    }
}
