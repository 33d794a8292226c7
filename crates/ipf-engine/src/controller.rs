//! Mode Controller
//!
//! Two states, driven by the root `data-ipf-enabled` attribute. Enabling
//! resolves and marks the target frame, suppresses chrome, mirrors the
//! state into the session and shows the safe zone. A failed enable lands
//! back in the disabled state with nothing left behind.

use ipf_css::SelectorError;
use ipf_dom::{Document, NodeId};

use crate::markers::{self, ATTR_HIDDEN, ATTR_TARGET, FRAME_TAG};
use crate::page::PageContext;
use crate::scheduler::{FrameTask, Viewport};
use crate::style;
use crate::suppressor::mark_hidden;

/// Pseudo-fullscreen mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    Disabled,
    Enabled,
}

impl ModeState {
    pub fn is_enabled(self) -> bool {
        self == ModeState::Enabled
    }
}

impl From<bool> for ModeState {
    fn from(enabled: bool) -> Self {
        if enabled {
            ModeState::Enabled
        } else {
            ModeState::Disabled
        }
    }
}

/// Why a frame selector did not yield a target
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    #[error("no element matches")]
    NoMatch,

    #[error("first match is <{local_name}>, not <iframe>")]
    NotAFrame { local_name: String },
}

/// Result of [`PageContext::enable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableOutcome {
    /// The mode is on with this target
    Enabled(NodeId),
    /// Nothing usable matched; the mode is off
    TargetNotFound(ResolveError),
}

impl EnableOutcome {
    pub fn is_enabled(&self) -> bool {
        matches!(self, EnableOutcome::Enabled(_))
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            EnableOutcome::Enabled(target) => Some(*target),
            EnableOutcome::TargetNotFound(_) => None,
        }
    }
}

/// First element matching `selector`, which must be a frame
pub fn resolve_frame(doc: &Document, selector: &str) -> Result<NodeId, ResolveError> {
    let node = doc.query_selector(selector)?.ok_or(ResolveError::NoMatch)?;
    match doc.local_name(node) {
        Some(FRAME_TAG) => Ok(node),
        other => Err(ResolveError::NotAFrame {
            local_name: other.unwrap_or_default().to_string(),
        }),
    }
}

impl<V: Viewport> PageContext<V> {
    /// Turn the mode on for the first frame matching `frame_selector`
    pub fn enable(&mut self, frame_selector: &str, hide_selector: &str) -> EnableOutcome {
        style::ensure_style(&mut self.document, &self.config);
        self.clear_target();

        let target = match resolve_frame(&self.document, frame_selector) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Pseudo-fullscreen target not found for '{}': {}", frame_selector, e);
                markers::set_enabled(&mut self.document, false);
                markers::clear_marked(&mut self.document, ATTR_HIDDEN);
                self.session.set_enabled(false);
                self.clear_safe_zone();
                return EnableOutcome::TargetNotFound(e);
            }
        };

        let _ = self.document.set_attribute(target, ATTR_TARGET, "1");
        self.last_target = Some(target);
        markers::set_enabled(&mut self.document, true);
        let hidden = mark_hidden(&mut self.document, hide_selector);

        self.session.set_enabled(true);
        self.session.set_selectors(frame_selector, hide_selector);
        self.ensure_safe_zone();
        self.scheduler.request(FrameTask::ScrollIntoView(target));

        tracing::info!(
            "Pseudo-fullscreen enabled on {:?} ({} elements hidden)",
            target,
            hidden
        );
        EnableOutcome::Enabled(target)
    }

    /// Turn the mode off and remove every trace of it
    pub fn disable(&mut self) {
        let was_enabled = self.is_enabled();

        self.clear_target();
        markers::clear_marked(&mut self.document, ATTR_HIDDEN);
        markers::set_enabled(&mut self.document, false);
        self.session.set_enabled(false);
        self.clear_safe_zone();

        if was_enabled {
            tracing::info!("Pseudo-fullscreen disabled");
        }
    }

    /// Flip the mode using the configured selectors
    pub fn toggle(&mut self) -> ModeState {
        if self.is_enabled() {
            self.disable();
            return ModeState::Disabled;
        }
        let selectors = self.config.selectors();
        self.enable(&selectors.frame, &selectors.hide).is_enabled().into()
    }

    /// Live mode, read from the document element
    pub fn is_enabled(&self) -> bool {
        markers::is_enabled(&self.document)
    }

    pub fn mode(&self) -> ModeState {
        self.is_enabled().into()
    }

    /// Unmark every connected target plus the last one we marked, which
    /// the page may be holding detached for later reuse
    fn clear_target(&mut self) {
        markers::clear_marked(&mut self.document, ATTR_TARGET);
        if let Some(previous) = self.last_target.take() {
            let _ = self.document.remove_attribute(previous, ATTR_TARGET);
        }
    }
}
