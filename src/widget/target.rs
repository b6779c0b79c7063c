//! The DOM boundary.
//!
//! The widget never touches markup directly; it describes every mutation as a
//! [`RenderOp`] and hands it to a [`RenderTarget`]. The in-memory
//! [`MessagePanel`](super::MessagePanel) is the target used by the server and
//! by tests.

use serde::{Deserialize, Serialize};

/// Identifier of the typing indicator node. At most one node carries it.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";

/// A rendered node: its element id plus escaped markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: String,
    pub html: String,
}

impl Fragment {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
        }
    }
}

/// A single mutation of the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RenderOp {
    /// Append a node to the end of the message list.
    #[serde(rename = "append")]
    Append(Fragment),
    /// Remove the node with the given id, if present.
    #[serde(rename = "remove")]
    Remove { id: String },
    /// Reset the text input.
    #[serde(rename = "clear-input")]
    ClearInput,
    /// Scroll the chat container to its content height.
    #[serde(rename = "scroll")]
    ScrollToBottom,
}

/// Receiver of render operations.
pub trait RenderTarget: Send + Sync {
    fn apply(&self, op: RenderOp);
}
