//! Singleton "searching" placeholder.

use std::sync::atomic::{AtomicBool, Ordering};

use super::render::render_typing;
use super::target::{RenderOp, RenderTarget, TYPING_INDICATOR_ID};

/// Tracks whether the typing indicator node is on the page.
///
/// `show` is a no-op while the indicator is visible and `hide` is a no-op
/// while it is not, so any call sequence leaves at most one node.
#[derive(Debug)]
pub struct TypingIndicator {
    assistant_name: String,
    visible: AtomicBool,
}

impl TypingIndicator {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            visible: AtomicBool::new(false),
        }
    }

    /// Append the indicator and scroll. Returns `false` if it was already shown.
    pub fn show(&self, target: &dyn RenderTarget) -> bool {
        if self.visible.swap(true, Ordering::AcqRel) {
            return false;
        }
        target.apply(RenderOp::Append(render_typing(&self.assistant_name)));
        target.apply(RenderOp::ScrollToBottom);
        true
    }

    /// Remove the indicator. Returns `false` if there was nothing to remove.
    pub fn hide(&self, target: &dyn RenderTarget) -> bool {
        if !self.visible.swap(false, Ordering::AcqRel) {
            return false;
        }
        target.apply(RenderOp::Remove {
            id: TYPING_INDICATOR_ID.to_string(),
        });
        true
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}
