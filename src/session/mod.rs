//! Per-browser widget sessions.
//!
//! Each browser tab gets its own [`WidgetSession`]: a [`ChatWidget`] and the
//! [`MessagePanel`] it renders into. Sessions live only in memory and are
//! identified by UUID.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use askuno_widget::session::WidgetStore;
//! use askuno_widget::widget::{ChatTransport, HttpTransport, WidgetOptions};
//!
//! let transport: Arc<dyn ChatTransport> =
//!     Arc::new(HttpTransport::new("http://127.0.0.1:5000", "/api/chat").unwrap());
//! let store = WidgetStore::new(transport, WidgetOptions::default(), 64, Duration::from_secs(1800));
//! let session = store.create();
//! session.widget().render("Hello!", true, Vec::new(), "");
//!
//! assert_eq!(session.panel().nodes().len(), 1);
//! ```
//!
//! [`ChatWidget`]: crate::widget::ChatWidget
//! [`MessagePanel`]: crate::widget::MessagePanel

mod store;

pub use store::{WidgetSession, WidgetStore};
