//! Pointer Safe-Zone Overlay
//!
//! A small fixed island over the target where the user can always find
//! the pointer again. It exists exactly while the mode is enabled.

use ipf_dom::{Document, NodeId};

use crate::markers::{self, SAFEZONE_ID};

/// The overlay element, if present
pub fn find(doc: &Document) -> Option<NodeId> {
    doc.get_element_by_id(SAFEZONE_ID)
}

/// Bring the overlay in line with the mode
///
/// Returns the overlay when the mode is enabled. When disabled, removes
/// any overlay and reports whether one was removed through `removed`.
pub fn ensure(doc: &mut Document) -> Ensure {
    if !markers::is_enabled(doc) {
        return Ensure::Absent { removed: remove(doc) };
    }
    if let Some(existing) = find(doc) {
        return Ensure::Present(existing);
    }
    let Some(root) = doc.document_element() else {
        return Ensure::Absent { removed: false };
    };

    let overlay = doc.create_element_with("div", &[("id", SAFEZONE_ID)]);
    match doc.tree.append_child(root, overlay) {
        Ok(_) => {
            tracing::debug!("Created safe-zone overlay");
            Ensure::Present(overlay)
        }
        Err(e) => {
            tracing::debug!("Safe-zone overlay not attached: {}", e);
            Ensure::Absent { removed: false }
        }
    }
}

/// Detach every overlay; returns whether anything was removed
pub fn remove(doc: &mut Document) -> bool {
    let mut removed = false;
    while let Some(overlay) = find(doc) {
        if doc.tree.detach(overlay).is_err() {
            break;
        }
        removed = true;
    }
    removed
}

/// Result of [`ensure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensure {
    Present(NodeId),
    Absent { removed: bool },
}
