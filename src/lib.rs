//! Askuno chat widget
//!
//! A chat widget that appends user and assistant messages to a scrolling
//! panel, shows a typing indicator while awaiting a backend reply, and posts
//! user input to a remote `/api/chat` endpoint.
//!
//! # Architecture
//!
//! - **Widget**: render model, typing indicator and submit handler, driven
//!   through a [`widget::ChatTransport`] and a [`widget::RenderTarget`]
//! - **Server**: Axum host that serves the widget page and streams render
//!   operations to the browser over SSE
//! - **UI**: plain HTML and a small inline script, no client-side framework
//!
//! # Modules
//!
//! - [`widget`]: the chat widget core
//! - [`session`]: per-browser widget sessions
//! - [`events`]: SSE encoding of render operations
//! - [`page`]: host page markup
//! - [`config`]: layered configuration
//! - [`server`]: HTTP routes

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod events;
pub mod page;
pub mod server;
pub mod session;
pub mod widget;

use crate::config::AppConfig;

use session::WidgetStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Widget sessions, one per browser tab.
    pub sessions: WidgetStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
