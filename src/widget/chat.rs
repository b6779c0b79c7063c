//! The chat widget and its submit handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::ChatError;
use super::message::{ChatRequest, ChatResponse, Message, Source};
use super::render::render_message;
use super::target::{RenderOp, RenderTarget};
use super::transport::{ChatTransport, RawReply};
use super::typing::TypingIndicator;

/// Shown when the backend answers 429.
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait a moment before sending another message.";

/// Shown for every other failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error processing your request.";

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing happened.
    Skipped,
    /// Another submission was still in flight; nothing happened.
    Busy,
    Answered,
    RateLimited,
    Errored,
    /// The request was cancelled; only the user message remains.
    Cancelled,
}

/// Where the widget is in the submission cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    #[default]
    Idle,
    UserMessageRendered,
    AwaitingResponse,
}

/// Tunables for a [`ChatWidget`].
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Name shown in the typing indicator label.
    pub assistant_name: String,
    /// Upper bound on the backend round trip; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            assistant_name: "Askuno".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// A chat widget bound to one render target and one backend transport.
///
/// Rendering, the typing indicator and scrolling are synchronous; the backend
/// call in [`submit`](Self::submit) is the only await point. A widget accepts
/// one submission at a time.
pub struct ChatWidget {
    transport: Arc<dyn ChatTransport>,
    target: Arc<dyn RenderTarget>,
    typing: TypingIndicator,
    state: Mutex<WidgetState>,
    cancel: Mutex<Option<CancellationToken>>,
    next_id: AtomicU64,
    request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("state", &self.state())
            .field("typing", &self.typing)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ChatWidget {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        target: Arc<dyn RenderTarget>,
        options: WidgetOptions,
    ) -> Self {
        Self {
            transport,
            target,
            typing: TypingIndicator::new(options.assistant_name),
            state: Mutex::new(WidgetState::Idle),
            cancel: Mutex::new(None),
            next_id: AtomicU64::new(1),
            request_timeout: options.request_timeout,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancel(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        *self.lock_state()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.is_visible()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Append a message node and scroll to it.
    ///
    /// For user messages `sources` and `confidence` are ignored.
    pub fn render(&self, content: &str, is_user: bool, sources: Vec<Source>, confidence: &str) {
        self.append(&Message::from_parts(content, is_user, sources, confidence));
    }

    /// Append an already-built message and scroll to it.
    pub fn append(&self, message: &Message) {
        let id = format!("msg-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.target.apply(RenderOp::Append(render_message(&id, message)));
        self.scroll_to_bottom();
    }

    pub fn show_typing(&self) -> bool {
        self.typing.show(self.target.as_ref())
    }

    pub fn hide_typing(&self) -> bool {
        self.typing.hide(self.target.as_ref())
    }

    pub fn scroll_to_bottom(&self) {
        self.target.apply(RenderOp::ScrollToBottom);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────

    /// Cancel the in-flight request, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        match self.lock_cancel().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Handle one submission of the input field.
    ///
    /// Renders the user message, clears the input, shows the typing
    /// indicator, posts to the backend and renders the answer or an advisory.
    /// The indicator is hidden before anything else is rendered, on every
    /// path, including when this future is dropped mid-flight.
    pub async fn submit(&self, raw_input: &str) -> SubmitOutcome {
        let message = raw_input.trim();
        if message.is_empty() {
            debug!(name: "widget.submit.skipped", "Ignoring empty input");
            return SubmitOutcome::Skipped;
        }

        let Some((guard, token)) = self.begin() else {
            debug!(name: "widget.submit.busy", "Submission already in flight");
            return SubmitOutcome::Busy;
        };

        self.append(&Message::user(message));
        self.target.apply(RenderOp::ClearInput);
        self.show_typing();
        self.set_state(WidgetState::AwaitingResponse);

        info!(
            name: "widget.submit.sent",
            message_length = message.len(),
            "Awaiting backend reply"
        );

        let request = ChatRequest {
            message: message.to_string(),
        };
        let result = self.exchange(&request, &token).await;
        // Settled: nothing left to cancel.
        self.lock_cancel().take();

        self.hide_typing();
        let outcome = self.settle(result);
        drop(guard);
        outcome
    }

    fn begin(&self) -> Option<(InFlight<'_>, CancellationToken)> {
        let mut state = self.lock_state();
        if *state != WidgetState::Idle {
            return None;
        }
        *state = WidgetState::UserMessageRendered;
        drop(state);

        let token = CancellationToken::new();
        *self.lock_cancel() = Some(token.clone());
        Some((InFlight { widget: self }, token))
    }

    fn set_state(&self, next: WidgetState) {
        *self.lock_state() = next;
    }

    async fn exchange(
        &self,
        request: &ChatRequest,
        token: &CancellationToken,
    ) -> Result<ChatResponse, ChatError> {
        let call = async {
            let post = self.transport.post(request);
            match self.request_timeout {
                Some(limit) => match tokio::time::timeout(limit, post).await {
                    Ok(reply) => reply.map_err(ChatError::from),
                    Err(_elapsed) => Err(ChatError::Timeout(limit)),
                },
                None => post.await.map_err(ChatError::from),
            }
        };

        let reply = tokio::select! {
            biased;
            () = token.cancelled() => return Err(ChatError::Cancelled),
            reply = call => reply?,
        };

        classify(reply)
    }

    fn settle(&self, result: Result<ChatResponse, ChatError>) -> SubmitOutcome {
        match result {
            Ok(resp) => {
                info!(
                    name: "widget.submit.answered",
                    sources = resp.sources.len(),
                    confidence = %resp.confidence,
                    "Rendering backend answer"
                );
                self.append(&Message::from(resp));
                SubmitOutcome::Answered
            }
            Err(ChatError::RateLimited) => {
                warn!(name: "widget.submit.rate_limited", "Backend rate limit hit");
                self.append(&Message::notice(RATE_LIMIT_MESSAGE));
                SubmitOutcome::RateLimited
            }
            Err(ChatError::Cancelled) => {
                info!(name: "widget.submit.cancelled", "Request cancelled");
                SubmitOutcome::Cancelled
            }
            Err(ChatError::RequestFailed { status, body }) => {
                warn!(
                    name: "widget.submit.failed",
                    status = %status,
                    body = %body,
                    "Backend returned an error status"
                );
                self.append(&Message::notice(GENERIC_ERROR_MESSAGE));
                SubmitOutcome::Errored
            }
            Err(e) => {
                error!(name: "widget.submit.error", error = %e, "Chat request failed");
                self.append(&Message::notice(GENERIC_ERROR_MESSAGE));
                SubmitOutcome::Errored
            }
        }
    }
}

/// Map a raw reply onto the three status branches.
pub fn classify(reply: RawReply) -> Result<ChatResponse, ChatError> {
    if reply.status.is_success() {
        Ok(serde_json::from_str(&reply.body)?)
    } else if reply.status == StatusCode::TOO_MANY_REQUESTS {
        Err(ChatError::RateLimited)
    } else {
        Err(ChatError::RequestFailed {
            status: reply.status,
            body: reply.body,
        })
    }
}

/// Returns the widget to idle when a submission ends, however it ends.
struct InFlight<'a> {
    widget: &'a ChatWidget,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.widget.hide_typing();
        self.widget.lock_cancel().take();
        self.widget.set_state(WidgetState::Idle);
    }
}
