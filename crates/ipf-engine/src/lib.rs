//! IPF Engine - Iframe pseudo-fullscreen
//!
//! Expands one embedded frame to fill the viewport, hides page chrome
//! around it, and keeps that state alive while the page re-renders.
//!
//! Everything the mode touches is document-scoped and lives in a
//! [`PageContext`]: the document, the session store, the animation-frame
//! queue and the viewport. The page integration layer owns the context and
//! feeds it inbound toggle messages, pointer/focus/visibility events and
//! mutation cycles.
//!
//! # Example
//! ```rust
//! use ipf_dom::Document;
//! use ipf_engine::{Config, ModeState, PageContext};
//!
//! let mut doc = Document::new("https://example.com/");
//! let body = doc.body().unwrap();
//! let frame = doc.create_element_with("iframe", &[]);
//! doc.tree.append_child(body, frame).unwrap();
//!
//! let mut page = PageContext::new(doc, Config::default());
//! page.install();
//! assert_eq!(page.toggle(), ModeState::Enabled);
//! assert_eq!(page.target(), Some(frame));
//! ```

mod config;
mod controller;
mod dispatch;
pub mod markers;
mod message;
mod page;
mod presence;
mod reconcile;
mod safezone;
mod scheduler;
mod session;
mod style;
mod suppressor;

pub use config::{Config, ConfigError, SelectorPair};
pub use controller::{resolve_frame, EnableOutcome, ModeState, ResolveError};
pub use dispatch::{DispatchError, TabId, TabMessenger, ToggleDispatcher, Trigger, TOGGLE_COMMAND};
pub use message::ControlMessage;
pub use page::PageContext;
pub use presence::{PageEvent, PointerPresence};
pub use reconcile::{plan, ReconcileAction, SessionSnapshot};
pub use scheduler::{
    FrameScheduler, FrameTask, RecordingViewport, ScrollError, ScrollIntoViewOptions,
    ScrollLogicalPosition, Viewport,
};
pub use session::{BlockedStorage, MemorySessionStorage, SessionBackend, SessionKeys, SessionStore, StorageError};
pub use style::stylesheet;
pub use suppressor::mark_hidden;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
