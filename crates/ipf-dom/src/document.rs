//! Document - High-level document API

use ipf_css::{parse_selector_list, SelectorError, SelectorList};

use crate::{DomResult, DomTree, ElementRef, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
}

impl Document {
    /// Create a document with the `html > (head, body)` skeleton
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let tree = &mut doc.tree;

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes under the document node cannot violate hierarchy rules
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `<html>` element (first element child of the document)
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree
            .children(self.tree.root())
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Get `<head>` element
    pub fn head(&self) -> Option<NodeId> {
        self.root_child_named("head")
    }

    /// Get `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.root_child_named("body")
    }

    fn root_child_named(&self, name: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree
            .children(html)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.local_name == name))
            .map(|(id, _)| id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Borrow an element for matching
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::new(&self.tree, id)
    }

    /// Lowercase tag name of an element
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.tree
            .get(id)?
            .as_element()
            .map(|e| e.local_name.as_str())
    }

    /// Whether the node is attached to this document
    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    /// Connected elements in document order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.tree
            .descendants(self.tree.root())
            .filter_map(move |(id, _)| ElementRef::new(&self.tree, id))
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .find(|e| e.data().id() == Some(id))
            .map(|e| e.node_id())
    }

    /// First element matching a selector string
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = parse_selector_list(selectors)?;
        Ok(self.query_selector_with(&list))
    }

    /// All elements matching a selector string, in document order
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = parse_selector_list(selectors)?;
        Ok(self.query_selector_all_with(&list))
    }

    /// First element matching a parsed selector list
    pub fn query_selector_with(&self, list: &SelectorList) -> Option<NodeId> {
        self.elements()
            .find(|e| list.matches(e))
            .map(|e| e.node_id())
    }

    /// All elements matching a parsed selector list
    pub fn query_selector_all_with(&self, list: &SelectorList) -> Vec<NodeId> {
        self.elements()
            .filter(|e| list.matches(e))
            .map(|e| e.node_id())
            .collect()
    }

    /// Read an attribute
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(id, name)
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.tree.set_attribute(id, name, value)
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        self.tree.remove_attribute(id, name)
    }

    /// Create an element carrying the given attributes
    pub fn create_element_with(&mut self, local_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.tree.create_element(local_name);
        for (name, value) in attrs {
            // Detached element: no observer can see this yet
            let _ = self.tree.set_attribute(id, name, value);
        }
        id
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
