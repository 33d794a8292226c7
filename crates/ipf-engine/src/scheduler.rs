//! Animation-frame scheduling and viewport scrolling
//!
//! Work that must wait for layout (centering the target) is queued here
//! and run by [`crate::PageContext::run_animation_frame`].

use std::collections::VecDeque;

use ipf_dom::{Document, NodeId};

/// Scroll error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScrollError {
    #[error("Cannot scroll to detached node {0:?}")]
    Detached(NodeId),

    #[error("Scrolling not supported by this viewport")]
    Unsupported,
}

/// `ScrollLogicalPosition`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollLogicalPosition {
    #[default]
    Start,
    Center,
    End,
    Nearest,
}

/// `ScrollIntoViewOptions`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollIntoViewOptions {
    pub block: ScrollLogicalPosition,
    pub inline: ScrollLogicalPosition,
}

impl ScrollIntoViewOptions {
    /// Center on both axes
    pub fn centered() -> Self {
        Self {
            block: ScrollLogicalPosition::Center,
            inline: ScrollLogicalPosition::Center,
        }
    }
}

/// The window's scrolling surface
pub trait Viewport {
    fn scroll_into_view(
        &mut self,
        doc: &Document,
        node: NodeId,
        options: ScrollIntoViewOptions,
    ) -> Result<(), ScrollError>;
}

/// Viewport that records every successful scroll
#[derive(Debug, Clone, Default)]
pub struct RecordingViewport {
    pub scrolls: Vec<(NodeId, ScrollIntoViewOptions)>,
    /// Fail every scroll with [`ScrollError::Unsupported`]
    pub fail: bool,
}

impl RecordingViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            scrolls: Vec::new(),
            fail: true,
        }
    }
}

impl Viewport for RecordingViewport {
    fn scroll_into_view(
        &mut self,
        doc: &Document,
        node: NodeId,
        options: ScrollIntoViewOptions,
    ) -> Result<(), ScrollError> {
        if self.fail {
            return Err(ScrollError::Unsupported);
        }
        if !doc.contains(node) {
            return Err(ScrollError::Detached(node));
        }
        self.scrolls.push((node, options));
        Ok(())
    }
}

/// Deferred work for the next animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    ScrollIntoView(NodeId),
}

/// FIFO of animation-frame callbacks
#[derive(Debug, Default)]
pub struct FrameScheduler {
    queue: VecDeque<FrameTask>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `requestAnimationFrame`
    pub fn request(&mut self, task: FrameTask) {
        self.queue.push_back(task);
    }

    /// Take every task queued so far; tasks requested while running wait
    /// for the following frame
    pub fn take_frame(&mut self) -> Vec<FrameTask> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
