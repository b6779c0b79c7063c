//! The chat widget core.
//!
//! A [`ChatWidget`] appends user and assistant messages to a panel, shows a
//! typing indicator while a backend reply is pending and posts user input to
//! the backend chat endpoint.
//!
//! # Structure
//!
//! - [`message`]: message model and backend wire types
//! - [`render`]: pure, escaping renderers returning [`Fragment`]s
//! - [`typing`]: the singleton typing indicator
//! - [`target`]: [`RenderOp`]s and the [`RenderTarget`] boundary
//! - [`panel`]: in-memory [`MessagePanel`] render target
//! - [`transport`]: [`ChatTransport`] seam and the `reqwest` implementation
//! - [`chat`]: the submit handler
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use askuno_widget::widget::{
//!     ChatTransport, ChatWidget, HttpTransport, MessagePanel, RenderTarget, WidgetOptions,
//! };
//!
//! let panel = Arc::new(MessagePanel::new(64));
//! let transport = HttpTransport::new("http://127.0.0.1:5000", "/api/chat").unwrap();
//! let target: Arc<dyn RenderTarget> = panel.clone();
//! let transport: Arc<dyn ChatTransport> = Arc::new(transport);
//! let widget = ChatWidget::new(transport, target, WidgetOptions::default());
//!
//! widget.render("Hello!", true, Vec::new(), "");
//! assert_eq!(panel.nodes().len(), 1);
//! ```

pub mod chat;
pub mod error;
pub mod message;
pub mod panel;
pub mod render;
pub mod target;
pub mod transport;
pub mod typing;

pub use chat::{
    ChatWidget, GENERIC_ERROR_MESSAGE, RATE_LIMIT_MESSAGE, SubmitOutcome, WidgetOptions,
    WidgetState,
};
pub use error::{ChatError, TransportError};
pub use message::{
    ChatRequest, ChatResponse, Confidence, ConfidenceLevel, Message, MessageRole, Source,
};
pub use panel::{MessagePanel, ScrollPosition};
pub use target::{Fragment, RenderOp, RenderTarget, TYPING_INDICATOR_ID};
pub use transport::{ChatTransport, HttpTransport, RawReply};
pub use typing::TypingIndicator;
