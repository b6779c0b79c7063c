//! Pure message rendering.
//!
//! Every function here returns a [`Fragment`] describing a node; nothing is
//! mutated. Content, titles and URLs are untrusted: text is escaped and links
//! are restricted to `http`/`https` or relative references.

use std::fmt::Write as _;

use url::Url;

use super::message::{Confidence, Message, Source};
use super::target::{Fragment, TYPING_INDICATOR_ID};

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Return a link target safe to place in `href`, or `#` when the URL uses a
/// scheme other than `http`/`https`.
pub fn safe_href(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => escape_html(raw),
        Ok(_) => "#".to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => escape_html(raw),
        Err(_) => "#".to_string(),
    }
}

/// Render a message node with the given element id.
pub fn render_message(id: &str, message: &Message) -> Fragment {
    if message.is_user() {
        render_user(id, message.content())
    } else {
        render_assistant(id, message.content(), message.sources(), message.confidence())
    }
}

/// Right-aligned user message with the "U" avatar.
pub fn render_user(id: &str, content: &str) -> Fragment {
    let html = format!(
        r#"<div id="{id}" class="message user-message mb-4">
    <div class="d-flex justify-content-end">
        <div class="message-content p-3 rounded-3 shadow-sm">
            <p class="mb-0">{content}</p>
        </div>
        <div class="avatar bg-primary text-white rounded-circle d-flex align-items-center justify-content-center ms-3">
            <span>U</span>
        </div>
    </div>
</div>"#,
        id = escape_html(id),
        content = escape_html(content),
    );
    Fragment::new(id, html)
}

/// Left-aligned assistant message with the "A" avatar, an optional
/// confidence badge after the content and an optional sources list.
pub fn render_assistant(
    id: &str,
    content: &str,
    sources: &[Source],
    confidence: Option<&Confidence>,
) -> Fragment {
    let badge = confidence.map(confidence_badge).unwrap_or_default();
    let sources_html = sources_list(sources);

    let html = format!(
        r#"<div id="{id}" class="message bot-message mb-4">
    <div class="d-flex">
        <div class="avatar bg-secondary text-white rounded-circle d-flex align-items-center justify-content-center me-3">
            <span>A</span>
        </div>
        <div class="message-content bg-light p-3 rounded-3 shadow-sm">
            <p class="mb-0">{content}{badge}</p>
            {sources_html}
        </div>
    </div>
</div>"#,
        id = escape_html(id),
        content = escape_html(content),
    );
    Fragment::new(id, html)
}

/// The "searching" placeholder: three animated dots plus a static label.
pub fn render_typing(assistant_name: &str) -> Fragment {
    let html = format!(
        r#"<div id="{TYPING_INDICATOR_ID}" class="message bot-message mb-4">
    <div class="d-flex">
        <div class="avatar bg-secondary text-white rounded-circle d-flex align-items-center justify-content-center me-3">
            <span>A</span>
        </div>
        <div class="message-content bg-light p-3 rounded-3 shadow-sm">
            <div class="typing-indicator">
                <span></span>
                <span></span>
                <span></span>
                <span class="ms-2">{name} is searching...</span>
            </div>
        </div>
    </div>
</div>"#,
        name = escape_html(assistant_name),
    );
    Fragment::new(TYPING_INDICATOR_ID, html)
}

fn confidence_badge(confidence: &Confidence) -> String {
    format!(
        r#"<span class="badge {} ms-2">{}</span>"#,
        confidence.level().badge_class(),
        escape_html(confidence.label()),
    )
}

fn sources_list(sources: &[Source]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut html = String::from(
        r#"<div class="sources mt-2"><small class="fw-bold">Sources:</small><ul class="mb-0">"#,
    );
    for source in sources {
        let _ = write!(
            html,
            r#"<li><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></li>"#,
            safe_href(&source.url),
            escape_html(&source.title),
        );
    }
    html.push_str("</ul></div>");
    html
}
