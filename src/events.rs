//! Server-sent event encoding for render operations.
//!
//! Browsers subscribe to `/chat/{id}/events` and replay each [`RenderOp`] on
//! the host page. Every op becomes one SSE frame whose event name identifies
//! the operation and whose data is the JSON-encoded op.
//!
//! # Example
//!
//! ```rust
//! use askuno_widget::events::sse_event;
//! use askuno_widget::widget::RenderOp;
//!
//! let sse = sse_event(&RenderOp::ScrollToBottom);
//! assert!(sse.starts_with("event: scroll\n"));
//! ```

use crate::widget::RenderOp;

/// Encode a [`RenderOp`] as an SSE frame.
pub fn sse_event(op: &RenderOp) -> String {
    let json = serde_json::to_string(op).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    });

    let event_name = event_name(op);

    format!("event: {event_name}\ndata: {json}\n\n")
}

/// SSE frame carrying the full panel markup the browser should start from.
pub fn reset_event(html: &str) -> String {
    let json = serde_json::json!({ "html": html });
    format!("event: reset\ndata: {json}\n\n")
}

/// SSE frame announcing that the subscriber fell behind and should reload.
pub fn resync_event(missed: u64) -> String {
    format!("event: resync\ndata: {{\"missed\":{missed}}}\n\n")
}

/// Get the SSE event name for a [`RenderOp`].
pub fn event_name(op: &RenderOp) -> &'static str {
    match op {
        RenderOp::Append(_) => "append",
        RenderOp::Remove { .. } => "remove",
        RenderOp::ClearInput => "clear-input",
        RenderOp::ScrollToBottom => "scroll",
    }
}
