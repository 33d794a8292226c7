//! Toggle Dispatcher
//!
//! Background side of the extension: the toolbar button and the keyboard
//! command both end up as one toggle message to the active tab.

use crate::message::ControlMessage;

/// Keyboard command bound to the toggle
pub const TOGGLE_COMMAND: &str = "toggle-pseudo-fullscreen";

/// Browser tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

/// What the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Toolbar action clicked
    ActionClicked,
    /// Named keyboard command
    Command(String),
}

impl Trigger {
    /// Whether this trigger maps to the toggle
    pub fn is_toggle(&self) -> bool {
        match self {
            Trigger::ActionClicked => true,
            Trigger::Command(name) => name == TOGGLE_COMMAND,
        }
    }
}

/// Dispatch error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Tab query failed: {0}")]
    Query(String),

    #[error("Sending to tab {tab:?} failed: {reason}")]
    Send { tab: TabId, reason: String },
}

/// Access to the browser's tabs
pub trait TabMessenger {
    /// The active tab of the current window
    fn active_tab(&mut self) -> Result<Option<TabId>, DispatchError>;

    fn send(&mut self, tab: TabId, message: &ControlMessage) -> Result<(), DispatchError>;
}

/// Fire-and-forget sender of toggle messages
#[derive(Debug)]
pub struct ToggleDispatcher<M> {
    messenger: M,
}

impl<M: TabMessenger> ToggleDispatcher<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn into_inner(self) -> M {
        self.messenger
    }

    /// Send one toggle for `trigger`; returns whether a message went out
    ///
    /// Errors are logged and dropped. Tabs without the content script
    /// (browser pages, stores) simply fail to receive.
    pub fn dispatch(&mut self, trigger: &Trigger) -> bool {
        if !trigger.is_toggle() {
            return false;
        }

        let tab = match self.messenger.active_tab() {
            Ok(Some(tab)) => tab,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("No tab for {:?}: {}", trigger, e);
                return false;
            }
        };

        match self.messenger.send(tab, &ControlMessage::TogglePseudoFullscreen) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Toggle not delivered: {}", e);
                false
            }
        }
    }
}
