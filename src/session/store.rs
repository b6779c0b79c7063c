//! Widget sessions and their store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::widget::{
    ChatTransport, ChatWidget, MessagePanel, RenderTarget, WidgetOptions, WidgetState,
};

/// One browser's widget and the panel it renders into.
#[derive(Debug)]
pub struct WidgetSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    widget: Arc<ChatWidget>,
    panel: Arc<MessagePanel>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Clone for WidgetSession {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl WidgetSession {
    fn new(
        id: String,
        transport: Arc<dyn ChatTransport>,
        options: WidgetOptions,
        event_buffer: usize,
    ) -> Self {
        let panel = Arc::new(MessagePanel::new(event_buffer));
        let target: Arc<dyn RenderTarget> = Arc::clone(&panel) as Arc<dyn RenderTarget>;
        let widget = Arc::new(ChatWidget::new(transport, target, options));
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                widget,
                panel,
                last_activity: RwLock::new(now),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn widget(&self) -> &Arc<ChatWidget> {
        &self.inner.widget
    }

    #[must_use]
    pub fn panel(&self) -> &Arc<MessagePanel> {
        &self.inner.panel
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Idle longer than `timeout` and not waiting on the backend.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        if self.inner.widget.state() != WidgetState::Idle {
            return false;
        }
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // Negative duration means clock skew; treat as fresh.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store of widget sessions keyed by UUID.
#[derive(Clone)]
pub struct WidgetStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    sessions: RwLock<HashMap<String, WidgetSession>>,
    transport: Arc<dyn ChatTransport>,
    options: WidgetOptions,
    event_buffer: usize,
    idle_timeout: Duration,
}

impl std::fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetStore")
            .field("sessions", &self.len())
            .field("options", &self.inner.options)
            .field("idle_timeout", &self.inner.idle_timeout)
            .finish()
    }
}

impl WidgetStore {
    /// Create a store whose widgets all post through `transport`.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        options: WidgetOptions,
        event_buffer: usize,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                sessions: RwLock::new(HashMap::new()),
                transport,
                options,
                event_buffer,
                idle_timeout,
            }),
        }
    }

    /// Create a new session, pruning idle ones first.
    pub fn create(&self) -> WidgetSession {
        let pruned = self.cleanup_expired();
        if pruned > 0 {
            tracing::debug!(name: "session.pruned", count = pruned, "Pruned idle sessions");
        }

        let id = Uuid::new_v4().to_string();
        let session = WidgetSession::new(
            id.clone(),
            Arc::clone(&self.inner.transport),
            self.inner.options.clone(),
            self.inner.event_buffer,
        );
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, session.clone());
        session
    }

    /// Get a session by ID and mark it active.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<WidgetSession> {
        let session = self
            .inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()?;
        session.touch();
        Some(session)
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<WidgetSession> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle longer than the configured timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(self.inner.idle_timeout)
    }

    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}
