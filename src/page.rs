//! Host page markup.
//!
//! The page exposes the four elements the widget relies on: `chat-form`,
//! `user-input`, `chat-messages` and `chat-container`. A small inline script
//! posts submissions and replays render operations from the session's event
//! stream. The stream opens with a `reset` frame that replaces the
//! pre-rendered list, so ops applied before it connected are not lost.

use crate::widget::render::escape_html;

/// Generate the HTML shell for the widget page.
pub fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Ask a question, get a sourced answer">
    <title>{title}</title>

    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen antialiased">
    <main id="app" class="container py-4">
        {content}
    </main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Chat widget content for one session.
///
/// `messages_html` is the already-rendered panel, so a reload shows the
/// conversation so far.
pub fn chat_content(session_id: &str, assistant_name: &str, messages_html: &str) -> String {
    let sid = escape_html(session_id);
    let name = escape_html(assistant_name);

    format!(
        r#"
    <div class="chat-shell card shadow-sm">
        <header class="card-header d-flex align-items-center justify-content-between">
            <h2 class="h5 mb-0">{name}</h2>
            <button id="chat-stop" type="button" class="btn btn-sm btn-outline-secondary">Stop</button>
        </header>

        <div id="chat-container" class="card-body overflow-auto" style="height: 60vh;">
            <div id="chat-messages" aria-live="polite" aria-label="Chat messages">
{messages_html}
            </div>
        </div>

        <div class="card-footer">
            <form id="chat-form" class="d-flex gap-2">
                <input id="user-input" name="message" type="text" class="form-control"
                    placeholder="Ask me anything..." autocomplete="off">
                <button type="submit" class="btn btn-primary">Send</button>
            </form>
        </div>
    </div>

    <script>
    (() => {{
        const container = document.getElementById('chat-container');
        const messages = document.getElementById('chat-messages');
        const input = document.getElementById('user-input');
        const form = document.getElementById('chat-form');
        const scrollToBottom = () => {{ container.scrollTop = container.scrollHeight; }};

        const events = new EventSource('/chat/{sid}/events');
        events.addEventListener('reset', (e) => {{
            messages.innerHTML = JSON.parse(e.data).html;
            scrollToBottom();
        }});
        events.addEventListener('append', (e) => {{
            const op = JSON.parse(e.data);
            messages.insertAdjacentHTML('beforeend', op.data.html);
        }});
        events.addEventListener('remove', (e) => {{
            const op = JSON.parse(e.data);
            const node = document.getElementById(op.data.id);
            if (node) node.remove();
        }});
        events.addEventListener('clear-input', () => {{ input.value = ''; }});
        events.addEventListener('scroll', scrollToBottom);
        events.addEventListener('resync', () => window.location.reload());

        form.addEventListener('submit', async (e) => {{
            e.preventDefault();
            try {{
                await fetch('/chat/{sid}/submit', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ message: input.value }})
                }});
            }} catch (error) {{
                console.error('Error:', error);
            }}
        }});
        document.getElementById('chat-stop').addEventListener('click', () => {{
            fetch('/chat/{sid}/cancel', {{ method: 'POST' }});
        }});

        scrollToBottom();
    }})();
    </script>
    "#
    )
}
