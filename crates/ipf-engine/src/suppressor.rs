//! Chrome Suppressor
//!
//! Marks page chrome hidden around the target. The hidden set is never
//! maintained incrementally: each call wipes it and recomputes it.

use ipf_dom::Document;

use crate::markers::{self, ATTR_HIDDEN};

/// Recompute the hidden set for `hide_selector`, returning its size
///
/// The target and any element containing it are never hidden. An empty
/// or malformed selector leaves the set empty.
pub fn mark_hidden(doc: &mut Document, hide_selector: &str) -> usize {
    markers::clear_marked(doc, ATTR_HIDDEN);
    if hide_selector.is_empty() {
        return 0;
    }

    let nodes = match doc.query_selector_all(hide_selector) {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::trace!("Hide selector matches nothing ({}): {}", hide_selector, e);
            return 0;
        }
    };

    let target = markers::find_target(doc);
    let mut count = 0;
    for node in nodes {
        if target.is_some_and(|t| doc.tree.contains(node, t)) {
            continue;
        }
        if doc.set_attribute(node, ATTR_HIDDEN, "1").is_ok() {
            count += 1;
        }
    }
    count
}
