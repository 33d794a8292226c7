//! Persistence Observer
//!
//! Pages re-render, swap frames and rebuild their chrome. After every
//! mutation batch the desired state is re-derived from the session and
//! re-applied. The loop is level-triggered: it looks only at the current
//! document, never at what the records say changed.

use ipf_css::parse_selector_list;
use ipf_dom::Document;

use crate::config::SelectorPair;
use crate::markers::{self, ATTR_TARGET, FRAME_TAG};
use crate::page::PageContext;
use crate::scheduler::Viewport;
use crate::suppressor::mark_hidden;

/// Session state relevant to reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub enabled: bool,
    pub selectors: SelectorPair,
}

/// What one reconciliation pass should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// The session does not want the mode on
    Idle,
    /// The mode broke; enable again
    Reenable { selectors: SelectorPair },
    /// The mode is intact; recompute chrome and the overlay
    Refresh { hide_selector: String },
}

/// Decide how to bring `doc` back in line with the session
///
/// Empty stored selectors fall back to `defaults`.
pub fn plan(doc: &Document, snapshot: &SessionSnapshot, defaults: &SelectorPair) -> ReconcileAction {
    if !snapshot.enabled {
        return ReconcileAction::Idle;
    }
    let selectors = snapshot.selectors.or_defaults(defaults);

    if !markers::is_enabled(doc) || !target_intact(doc, &selectors.frame) {
        return ReconcileAction::Reenable { selectors };
    }
    ReconcileAction::Refresh {
        hide_selector: selectors.hide,
    }
}

/// Exactly one connected frame is marked and it still matches `frame_selector`
fn target_intact(doc: &Document, frame_selector: &str) -> bool {
    let marked = markers::marked(doc, ATTR_TARGET);
    let [target] = marked.as_slice() else {
        return false;
    };
    if doc.local_name(*target) != Some(FRAME_TAG) {
        return false;
    }
    let Ok(list) = parse_selector_list(frame_selector) else {
        return false;
    };
    doc.element(*target).is_some_and(|e| list.matches(&e))
}

impl<V: Viewport> PageContext<V> {
    /// One reconciliation pass against the current session
    pub fn reconcile(&mut self) -> ReconcileAction {
        let action = plan(
            &self.document,
            &self.session.snapshot(),
            &self.config.selectors(),
        );
        match &action {
            ReconcileAction::Idle => {}
            ReconcileAction::Reenable { selectors } => {
                tracing::debug!("Pseudo-fullscreen broken by page, re-enabling");
                self.enable(&selectors.frame, &selectors.hide);
            }
            ReconcileAction::Refresh { hide_selector } => {
                let hidden = mark_hidden(&mut self.document, hide_selector);
                self.ensure_safe_zone();
                tracing::trace!("Refreshed pseudo-fullscreen ({} elements hidden)", hidden);
            }
        }
        action
    }

    /// One observation cycle
    ///
    /// Drains pending mutation records and reconciles if there were any.
    /// Records caused by the reconciliation itself are dropped, so a
    /// consistent document settles. Returns `None` when nothing happened.
    pub fn process_mutations(&mut self) -> Option<ReconcileAction> {
        let observer = self.observer?;
        let records = self.document.tree.take_records(observer);
        if records.is_empty() {
            return None;
        }
        tracing::trace!("Observed {} mutation records", records.len());

        let action = self.reconcile();
        self.document.tree.take_records(observer);
        Some(action)
    }
}
