//! Pointer Presence
//!
//! Whether the pointer is inside the page and inside the safe zone. Fed by
//! document-wide capture listeners plus the overlay's own enter/leave
//! listeners; purely visual, never touches the mode.

use ipf_dom::NodeId;

/// Page-level input, focus and visibility events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// `mouseenter` on an element
    PointerEnter(NodeId),
    /// `mouseleave` from an element
    PointerLeave(NodeId),
    /// Window gained focus
    WindowFocus,
    /// Window lost focus
    WindowBlur,
    /// `visibilitychange`
    VisibilityChange { hidden: bool },
}

/// Pointer containment flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPresence {
    pub page_inside: bool,
    pub zone_inside: bool,
}

impl Default for PointerPresence {
    fn default() -> Self {
        Self {
            page_inside: true,
            zone_inside: false,
        }
    }
}

impl PointerPresence {
    /// Apply one event; `on_zone` tells whether an enter/leave targets the overlay
    ///
    /// Document capture listeners run before the overlay's own listeners,
    /// so leaving the overlay clears both flags and entering it sets both.
    pub fn apply(&mut self, event: PageEvent, on_zone: bool) {
        match event {
            PageEvent::PointerEnter(_) => {
                self.page_inside = true;
                if on_zone {
                    self.zone_inside = true;
                }
            }
            PageEvent::PointerLeave(_) => {
                self.page_inside = false;
                self.zone_inside = false;
            }
            PageEvent::WindowBlur | PageEvent::VisibilityChange { hidden: true } => {
                self.page_inside = false;
                self.zone_inside = false;
            }
            PageEvent::WindowFocus | PageEvent::VisibilityChange { hidden: false } => {
                self.page_inside = true;
            }
        }
    }
}
