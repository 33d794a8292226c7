//! Page - Document-scoped pseudo-fullscreen state

use ipf_dom::{Document, MutationObserverInit, NodeId, ObserverId};

use crate::controller::ModeState;
use crate::markers::{self, ATTR_HIDDEN, ATTR_PAGE_INSIDE, ATTR_ZONE_INSIDE};
use crate::message::ControlMessage;
use crate::presence::{PageEvent, PointerPresence};
use crate::safezone;
use crate::scheduler::{FrameScheduler, FrameTask, RecordingViewport, ScrollIntoViewOptions, Viewport};
use crate::session::{MemorySessionStorage, SessionBackend, SessionStore};
use crate::style;
use crate::Config;

/// Everything the mode needs for one document
pub struct PageContext<V: Viewport = RecordingViewport> {
    pub(crate) document: Document,
    pub(crate) session: SessionStore,
    pub(crate) viewport: V,
    pub(crate) scheduler: FrameScheduler,
    pub(crate) config: Config,
    pub(crate) presence: PointerPresence,
    pub(crate) observer: Option<ObserverId>,
    /// Last element marked as target; may since have been detached
    pub(crate) last_target: Option<NodeId>,
}

impl PageContext<RecordingViewport> {
    /// Context with a fresh in-memory session
    pub fn new(document: Document, config: Config) -> Self {
        let session = SessionStore::new(Box::new(MemorySessionStorage::new()), config.session_keys());
        Self {
            document,
            session,
            viewport: RecordingViewport::new(),
            scheduler: FrameScheduler::new(),
            config,
            presence: PointerPresence::default(),
            observer: None,
            last_target: None,
        }
    }
}

impl<V: Viewport> PageContext<V> {
    /// Use another session backend, keyed by this context's config
    pub fn with_session(mut self, backend: impl SessionBackend + 'static) -> Self {
        self.session = SessionStore::new(Box::new(backend), self.config.session_keys());
        self
    }

    /// Use another viewport
    pub fn with_viewport<W: Viewport>(self, viewport: W) -> PageContext<W> {
        PageContext {
            document: self.document,
            session: self.session,
            viewport,
            scheduler: self.scheduler,
            config: self.config,
            presence: self.presence,
            observer: self.observer,
            last_target: self.last_target,
        }
    }

    /// First-load bootstrap
    ///
    /// Restores the mode if the session says it was on, otherwise seeds the
    /// session with the default selectors, then starts observing the
    /// document. Calling it again does nothing.
    pub fn install(&mut self) {
        if self.observer.is_some() {
            tracing::debug!("Pseudo-fullscreen already installed");
            return;
        }

        style::ensure_style(&mut self.document, &self.config);

        self.presence = PointerPresence::default();
        self.mirror_presence();

        let snapshot = self.session.snapshot();
        let defaults = self.config.selectors();
        if snapshot.enabled {
            let selectors = snapshot.selectors.or_defaults(&defaults);
            tracing::debug!("Restoring pseudo-fullscreen from session");
            self.enable(&selectors.frame, &selectors.hide);
        } else {
            self.session.set_selectors(&defaults.frame, &defaults.hide);
        }

        let root = self.document.document_element().unwrap_or(NodeId::ROOT);
        let observer = self
            .document
            .tree
            .observe(root, MutationObserverInit::child_list_subtree());
        self.observer = Some(observer);

        self.ensure_safe_zone();
        self.document.tree.take_records(observer);
        tracing::info!("Pseudo-fullscreen installed on {}", self.document.url());
    }

    /// Stop observing the document
    pub fn uninstall(&mut self) {
        if let Some(observer) = self.observer.take() {
            self.document.tree.disconnect(observer);
        }
    }

    /// Handle a pointer, focus or visibility event
    pub fn handle_event(&mut self, event: PageEvent) {
        let on_zone = match event {
            PageEvent::PointerEnter(node) | PageEvent::PointerLeave(node) => {
                safezone::find(&self.document) == Some(node)
            }
            _ => false,
        };
        self.presence.apply(event, on_zone);
        self.mirror_presence();
    }

    /// Handle an inbound control message
    pub fn handle_message(&mut self, message: &ControlMessage) -> ModeState {
        match message {
            ControlMessage::TogglePseudoFullscreen => self.toggle(),
        }
    }

    /// Handle a serialized control message; unknown messages are ignored
    pub fn handle_raw_message(&mut self, raw: &str) -> Option<ModeState> {
        match ControlMessage::from_json(raw) {
            Ok(message) => Some(self.handle_message(&message)),
            Err(e) => {
                tracing::debug!("Ignoring message {}: {}", raw, e);
                None
            }
        }
    }

    /// Run the tasks queued for this animation frame; returns how many ran
    pub fn run_animation_frame(&mut self) -> usize {
        let tasks = self.scheduler.take_frame();
        for task in &tasks {
            match *task {
                FrameTask::ScrollIntoView(node) => {
                    let options = ScrollIntoViewOptions::centered();
                    if let Err(e) = self.viewport.scroll_into_view(&self.document, node, options) {
                        tracing::debug!("Centering scroll skipped: {}", e);
                    }
                }
            }
        }
        tasks.len()
    }

    pub(crate) fn ensure_safe_zone(&mut self) {
        if let safezone::Ensure::Absent { removed: true } = safezone::ensure(&mut self.document) {
            self.reset_zone();
        }
    }

    pub(crate) fn clear_safe_zone(&mut self) {
        safezone::remove(&mut self.document);
        self.reset_zone();
    }

    fn reset_zone(&mut self) {
        self.presence.zone_inside = false;
        markers::set_root_flag(&mut self.document, ATTR_ZONE_INSIDE, false);
    }

    fn mirror_presence(&mut self) {
        markers::set_root_flag(&mut self.document, ATTR_PAGE_INSIDE, self.presence.page_inside);
        markers::set_root_flag(&mut self.document, ATTR_ZONE_INSIDE, self.presence.zone_inside);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document access for the page's own scripts
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn presence(&self) -> PointerPresence {
        self.presence
    }

    pub fn is_installed(&self) -> bool {
        self.observer.is_some()
    }

    /// The marked target frame
    pub fn target(&self) -> Option<NodeId> {
        markers::find_target(&self.document)
    }

    /// Currently suppressed chrome, in document order
    pub fn hidden_elements(&self) -> Vec<NodeId> {
        markers::marked(&self.document, ATTR_HIDDEN)
    }

    pub fn safe_zone(&self) -> Option<NodeId> {
        safezone::find(&self.document)
    }

    /// Number of tasks waiting for the next animation frame
    pub fn pending_frames(&self) -> usize {
        self.scheduler.len()
    }
}

impl<V: Viewport> std::fmt::Debug for PageContext<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("url", &self.document.url())
            .field("session", &self.session)
            .field("config", &self.config)
            .field("presence", &self.presence)
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}
