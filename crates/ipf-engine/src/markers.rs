//! Marker attributes and element ids
//!
//! All mode state that the page can see is carried by these attributes;
//! the stylesheet keys every rule off them.

use ipf_dom::{Document, NodeId};

/// On the document element while the mode is on
pub const ATTR_ENABLED: &str = "data-ipf-enabled";
/// On the single target frame
pub const ATTR_TARGET: &str = "data-ipf-target";
/// On every suppressed chrome element
pub const ATTR_HIDDEN: &str = "data-ipf-hidden";
/// On the document element: pointer is inside the page
pub const ATTR_PAGE_INSIDE: &str = "data-ipf-page-inside";
/// On the document element: pointer is over the safe zone
pub const ATTR_ZONE_INSIDE: &str = "data-ipf-zone-inside";

/// Id of the injected `<style>` element
pub const STYLE_ID: &str = "ipf-style";
/// Id of the safe-zone overlay
pub const SAFEZONE_ID: &str = "ipf-cursor-safezone";

/// Only this element kind can become the target
pub const FRAME_TAG: &str = "iframe";

pub const DEFAULT_FRAME_SELECTOR: &str = "iframe";
pub const DEFAULT_HIDE_SELECTOR: &str =
    "header, nav, [role='banner'], .header, #header, .navbar, #navbar, .topbar, .sticky, .fixed-top";

/// Live mode flag on the document element
pub fn is_enabled(doc: &Document) -> bool {
    root_flag(doc, ATTR_ENABLED) == Some(true)
}

/// Read a `"1"`/`"0"` flag from the document element
pub fn root_flag(doc: &Document, attr: &str) -> Option<bool> {
    let root = doc.document_element()?;
    doc.get_attribute(root, attr).map(|v| v == "1")
}

/// Write a `"1"`/`"0"` flag on the document element
pub fn set_root_flag(doc: &mut Document, attr: &str, value: bool) {
    if let Some(root) = doc.document_element() {
        let _ = doc.set_attribute(root, attr, if value { "1" } else { "0" });
    }
}

/// Set or remove the enabled attribute
pub fn set_enabled(doc: &mut Document, enabled: bool) {
    let Some(root) = doc.document_element() else {
        return;
    };
    let _ = if enabled {
        doc.set_attribute(root, ATTR_ENABLED, "1")
    } else {
        doc.remove_attribute(root, ATTR_ENABLED).map(|_| ())
    };
}

/// Connected elements carrying `attr="1"`, in document order
pub fn marked(doc: &Document, attr: &str) -> Vec<NodeId> {
    doc.elements()
        .filter(|e| e.data().get_attr(attr) == Some("1"))
        .map(|e| e.node_id())
        .collect()
}

/// First connected element marked as target
pub fn find_target(doc: &Document) -> Option<NodeId> {
    doc.elements()
        .find(|e| e.data().get_attr(ATTR_TARGET) == Some("1"))
        .map(|e| e.node_id())
}

/// Remove `attr` from every connected element carrying it
pub fn clear_marked(doc: &mut Document, attr: &str) {
    for id in marked(doc, attr) {
        let _ = doc.remove_attribute(id, attr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_flag() {
        let mut doc = Document::default();
        assert!(!is_enabled(&doc));

        set_enabled(&mut doc, true);
        assert!(is_enabled(&doc));

        set_enabled(&mut doc, false);
        assert!(!is_enabled(&doc));
        let root = doc.document_element().unwrap();
        assert_eq!(doc.get_attribute(root, ATTR_ENABLED), None);
    }

    #[test]
    fn test_flags_on_empty_document() {
        let mut doc = Document::empty("about:blank");
        set_enabled(&mut doc, true);
        set_root_flag(&mut doc, ATTR_PAGE_INSIDE, true);

        assert!(!is_enabled(&doc));
        assert_eq!(root_flag(&doc, ATTR_PAGE_INSIDE), None);
    }

    #[test]
    fn test_clear_marked() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let a = doc.create_element_with("div", &[(ATTR_HIDDEN, "1")]);
        let b = doc.create_element_with("div", &[(ATTR_HIDDEN, "1")]);
        doc.tree.append_child(body, a).unwrap();
        doc.tree.append_child(body, b).unwrap();

        assert_eq!(marked(&doc, ATTR_HIDDEN), vec![a, b]);
        clear_marked(&mut doc, ATTR_HIDDEN);
        assert!(marked(&doc, ATTR_HIDDEN).is_empty());
    }
}
