//! In-memory message panel.
//!
//! [`MessagePanel`] is the server-side mirror of the `chat-messages` list and
//! the `chat-container` scroll position. It applies [`RenderOp`]s to an
//! append-only node log and rebroadcasts each op to subscribed browsers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::target::{Fragment, RenderOp, RenderTarget};

/// Scroll state of the chat container, measured in nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub top: usize,
    pub content_height: usize,
}

impl ScrollPosition {
    #[must_use]
    pub fn at_bottom(self) -> bool {
        self.top >= self.content_height
    }
}

#[derive(Debug, Default)]
struct PanelState {
    nodes: Vec<Fragment>,
    scroll: ScrollPosition,
    input_clears: usize,
}

/// Render target backed by an in-memory node list.
#[derive(Debug)]
pub struct MessagePanel {
    state: Mutex<PanelState>,
    events: broadcast::Sender<RenderOp>,
}

impl MessagePanel {
    /// Create an empty panel; `event_buffer` bounds how many ops a slow
    /// subscriber may lag behind before it starts missing them.
    #[must_use]
    pub fn new(event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            state: Mutex::new(PanelState::default()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to ops applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RenderOp> {
        self.events.subscribe()
    }

    /// Current markup plus a receiver for every op applied after it.
    ///
    /// Both are taken under the panel lock, so no op falls between the
    /// snapshot and the subscription and none is counted twice.
    pub fn snapshot_and_subscribe(&self) -> (String, broadcast::Receiver<RenderOp>) {
        let state = self.lock();
        let rx = self.events.subscribe();
        (join_html(&state.nodes), rx)
    }

    /// Snapshot of the nodes currently in the list, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Fragment> {
        self.lock().nodes.clone()
    }

    /// Concatenated markup of every node, for pre-rendering the page.
    #[must_use]
    pub fn html(&self) -> String {
        join_html(&self.lock().nodes)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().nodes.iter().any(|n| n.id == id)
    }

    #[must_use]
    pub fn scroll(&self) -> ScrollPosition {
        self.lock().scroll
    }

    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll().at_bottom()
    }

    /// How many times the input field has been cleared.
    #[must_use]
    pub fn input_clears(&self) -> usize {
        self.lock().input_clears
    }
}

fn join_html(nodes: &[Fragment]) -> String {
    nodes
        .iter()
        .map(|n| n.html.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl RenderTarget for MessagePanel {
    fn apply(&self, op: RenderOp) {
        let mut state = self.lock();
        match &op {
            RenderOp::Append(fragment) => {
                state.nodes.push(fragment.clone());
                state.scroll.content_height = state.nodes.len();
            }
            RenderOp::Remove { id } => {
                state.nodes.retain(|n| &n.id != id);
                state.scroll.content_height = state.nodes.len();
                state.scroll.top = state.scroll.top.min(state.scroll.content_height);
            }
            RenderOp::ClearInput => state.input_clears += 1,
            RenderOp::ScrollToBottom => state.scroll.top = state.scroll.content_height,
        }

        // Sent under the lock so snapshots and the op stream stay in step.
        // No subscribers is fine; the node log is the source of truth.
        let _ = self.events.send(op);
        drop(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_scroll() {
        let panel = MessagePanel::new(4);
        panel.apply(RenderOp::Append(Fragment::new("a", "<div>a</div>")));
        assert!(!panel.is_scrolled_to_bottom());

        panel.apply(RenderOp::ScrollToBottom);
        assert!(panel.is_scrolled_to_bottom());
        assert_eq!(panel.scroll().content_height, 1);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let panel = MessagePanel::new(4);
        panel.apply(RenderOp::Append(Fragment::new("a", "<div>a</div>")));
        panel.apply(RenderOp::Remove { id: "b".to_string() });
        assert_eq!(panel.nodes().len(), 1);
        assert!(panel.contains("a"));
    }

    #[test]
    fn test_remove_clamps_scroll() {
        let panel = MessagePanel::new(4);
        panel.apply(RenderOp::Append(Fragment::new("a", "a")));
        panel.apply(RenderOp::Append(Fragment::new("b", "b")));
        panel.apply(RenderOp::ScrollToBottom);
        panel.apply(RenderOp::Remove { id: "b".to_string() });
        assert_eq!(panel.scroll(), ScrollPosition { top: 1, content_height: 1 });
    }

    #[test]
    fn test_html_joins_in_order() {
        let panel = MessagePanel::new(4);
        panel.apply(RenderOp::Append(Fragment::new("a", "<p>1</p>")));
        panel.apply(RenderOp::Append(Fragment::new("b", "<p>2</p>")));
        assert_eq!(panel.html(), "<p>1</p>\n<p>2</p>");
    }

    #[tokio::test]
    async fn test_subscribers_receive_ops() {
        let panel = MessagePanel::new(4);
        let mut rx = panel.subscribe();

        panel.apply(RenderOp::ClearInput);
        panel.apply(RenderOp::ScrollToBottom);

        assert_eq!(rx.recv().await.unwrap(), RenderOp::ClearInput);
        assert_eq!(rx.recv().await.unwrap(), RenderOp::ScrollToBottom);
        assert_eq!(panel.input_clears(), 1);
    }

    #[test]
    fn test_snapshot_then_only_later_ops() {
        let panel = MessagePanel::new(8);
        panel.apply(RenderOp::Append(Fragment::new("a", "<p>a</p>")));

        let (snapshot, mut rx) = panel.snapshot_and_subscribe();
        panel.apply(RenderOp::Remove { id: "a".to_string() });
        panel.apply(RenderOp::Append(Fragment::new("b", "<p>b</p>")));

        assert_eq!(snapshot, "<p>a</p>");
        assert_eq!(rx.try_recv().unwrap(), RenderOp::Remove { id: "a".to_string() });
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderOp::Append(Fragment::new("b", "<p>b</p>"))
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(panel.html(), "<p>b</p>");
    }
}
