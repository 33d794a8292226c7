//! IPF DOM - Document Object Model
//!
//! Arena-based DOM tree with attribute storage, document-order selector
//! queries and a `MutationObserver`-style record queue.

mod document;
mod element_ref;
mod node;
mod observer;
mod tree;

pub use document::Document;
pub use element_ref::ElementRef;
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0:?} does not exist")]
    NotFound(NodeId),

    #[error("Hierarchy request error")]
    HierarchyRequest,

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node is not a child of the given parent")]
    NotAChild,
}
