//! Chat message model and backend wire types.

use serde::{Deserialize, Serialize};

/// Author of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the person using the widget.
    User,
    /// Message rendered on behalf of the backend.
    Assistant,
}

/// A citation attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Link target.
    pub url: String,
    /// Display title.
    pub title: String,
}

impl Source {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Visual level of a confidence badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// CSS class for the badge.
    #[must_use]
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::High => "badge-high",
            Self::Medium => "badge-medium",
            Self::Low => "badge-low",
        }
    }
}

/// Backend-reported confidence, kept with the label exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confidence {
    label: String,
    level: ConfidenceLevel,
}

impl Confidence {
    /// Parse a wire label.
    ///
    /// An empty label means "no badge". `"high"` and `"medium"` match exactly;
    /// any other non-empty label is shown with the low badge.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        if label.is_empty() {
            return None;
        }
        let level = match label {
            "high" => ConfidenceLevel::High,
            "medium" => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        };
        Some(Self {
            label: label.to_string(),
            level,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn level(&self) -> ConfidenceLevel {
        self.level
    }
}

/// A message as held by the panel.
///
/// User messages never carry sources or a confidence badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: MessageRole,
    content: String,
    sources: Vec<Source>,
    confidence: Option<Confidence>,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            sources: Vec::new(),
            confidence: None,
        }
    }

    /// Create an assistant message with optional citations and badge.
    pub fn assistant(
        content: impl Into<String>,
        sources: Vec<Source>,
        confidence: Option<Confidence>,
    ) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            sources,
            confidence,
        }
    }

    /// Create an assistant message with no sources and no badge.
    pub fn notice(content: impl Into<String>) -> Self {
        Self::assistant(content, Vec::new(), None)
    }

    /// Build the same message `render(content, is_user, sources, confidence)`
    /// would: for user messages sources and confidence are dropped.
    pub fn from_parts(
        content: impl Into<String>,
        is_user: bool,
        sources: Vec<Source>,
        confidence: &str,
    ) -> Self {
        if is_user {
            Self::user(content)
        } else {
            Self::assistant(content, sources, Confidence::from_label(confidence))
        }
    }

    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[must_use]
    pub fn confidence(&self) -> Option<&Confidence> {
        self.confidence.as_ref()
    }
}

/// Body posted to the backend chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user input.
    pub message: String,
}

/// Successful backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer text.
    pub answer: String,
    /// Citations, in display order.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// `"high"`, `"medium"`, `"low"` or empty.
    #[serde(default)]
    pub confidence: String,
}

impl From<ChatResponse> for Message {
    fn from(resp: ChatResponse) -> Self {
        let confidence = Confidence::from_label(&resp.confidence);
        Message::assistant(resp.answer, resp.sources, confidence)
    }
}
