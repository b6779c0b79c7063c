//! End-to-end widget behaviour against a mocked backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use askuno_widget::widget::{
    ChatRequest, ChatTransport, ChatWidget, MessagePanel, RawReply, RenderOp, RenderTarget,
    SubmitOutcome, TYPING_INDICATOR_ID, TransportError, WidgetOptions, WidgetState,
};
use reqwest::StatusCode;
use tokio::sync::Notify;

const PARIS: &str = r#"{"answer":"Paris is the capital.","sources":[{"url":"https://x","title":"X"}],"confidence":"high"}"#;

/// Answers after a delay, signalling when the request arrives.
struct DelayedBackend {
    delay: Duration,
    arrived: Notify,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ChatTransport for DelayedBackend {
    async fn post(&self, request: &ChatRequest) -> Result<RawReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.arrived.notify_one();
        tokio::time::sleep(self.delay).await;

        let body = if request.message == "What is the capital of France?" {
            PARIS.to_string()
        } else {
            serde_json::json!({
                "answer": format!("answer to {}", request.message),
                "sources": [],
                "confidence": "medium"
            })
            .to_string()
        };
        Ok(RawReply::new(StatusCode::OK, body))
    }
}

fn setup(delay: Duration) -> (Arc<DelayedBackend>, Arc<ChatWidget>, Arc<MessagePanel>) {
    let backend = Arc::new(DelayedBackend {
        delay,
        arrived: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let panel = Arc::new(MessagePanel::new(64));
    let transport: Arc<dyn ChatTransport> = Arc::clone(&backend) as Arc<dyn ChatTransport>;
    let target: Arc<dyn RenderTarget> = Arc::clone(&panel) as Arc<dyn RenderTarget>;
    let widget = Arc::new(ChatWidget::new(transport, target, WidgetOptions::default()));
    (backend, widget, panel)
}

#[tokio::test(start_paused = true)]
async fn test_capital_of_france_scenario() {
    let (backend, widget, panel) = setup(Duration::from_secs(2));
    let mut ops = panel.subscribe();

    let submission = tokio::spawn({
        let widget = Arc::clone(&widget);
        async move { widget.submit("What is the capital of France?").await }
    });
    backend.arrived.notified().await;

    // While waiting: the user message is shown right-aligned, then the indicator.
    let nodes = panel.nodes();
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].html.contains("user-message"));
    assert!(nodes[0].html.contains("justify-content-end"));
    assert!(nodes[0].html.contains("What is the capital of France?"));
    assert_eq!(nodes[1].id, TYPING_INDICATOR_ID);
    assert!(panel.is_scrolled_to_bottom());
    assert_eq!(widget.state(), WidgetState::AwaitingResponse);

    assert_eq!(submission.await.unwrap(), SubmitOutcome::Answered);

    let nodes = panel.nodes();
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].html.contains("What is the capital of France?"));
    assert!(nodes[1].html.contains("Paris is the capital."));
    assert!(nodes[1].html.contains("badge-high"));
    assert!(nodes[1].html.contains(r#"href="https://x""#));
    assert!(nodes[1].html.contains(">X</a>"));
    assert!(!panel.contains(TYPING_INDICATOR_ID));
    assert!(panel.is_scrolled_to_bottom());

    // The browser sees: user message, scroll, clear input, indicator, scroll,
    // indicator removed, answer, scroll.
    let mut seen = Vec::new();
    while let Ok(op) = ops.try_recv() {
        seen.push(op);
    }
    let kinds: Vec<&str> = seen
        .iter()
        .map(|op| match op {
            RenderOp::Append(f) if f.id == TYPING_INDICATOR_ID => "show-typing",
            RenderOp::Append(_) => "append",
            RenderOp::Remove { .. } => "remove",
            RenderOp::ClearInput => "clear-input",
            RenderOp::ScrollToBottom => "scroll",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "append",
            "scroll",
            "clear-input",
            "show-typing",
            "scroll",
            "remove",
            "append",
            "scroll"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_joining_mid_flight_sees_settlement() {
    let (backend, widget, panel) = setup(Duration::from_secs(2));

    let submission = tokio::spawn({
        let widget = Arc::clone(&widget);
        async move { widget.submit("What is the capital of France?").await }
    });
    backend.arrived.notified().await;

    // A browser (re)connecting now starts from the indicator...
    let (snapshot, mut ops) = panel.snapshot_and_subscribe();
    assert!(snapshot.contains("What is the capital of France?"));
    assert!(snapshot.contains(&format!(r#"id="{TYPING_INDICATOR_ID}""#)));

    assert_eq!(submission.await.unwrap(), SubmitOutcome::Answered);

    // ...and is told to remove it, then shown the answer.
    let mut seen = Vec::new();
    while let Ok(op) = ops.try_recv() {
        seen.push(op);
    }
    let answer = panel.nodes().pop().unwrap();
    assert!(answer.html.contains("Paris is the capital."));
    assert_eq!(
        seen,
        vec![
            RenderOp::Remove {
                id: TYPING_INDICATOR_ID.to_string()
            },
            RenderOp::Append(answer),
            RenderOp::ScrollToBottom,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sequential_submissions_keep_order() {
    let (backend, widget, panel) = setup(Duration::from_millis(250));

    let questions = ["one", "two", "three", "four"];
    for q in questions {
        assert_eq!(widget.submit(q).await, SubmitOutcome::Answered);
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), questions.len());

    let nodes = panel.nodes();
    assert_eq!(nodes.len(), questions.len() * 2);
    for (i, q) in questions.iter().enumerate() {
        let user = &nodes[i * 2];
        let answer = &nodes[i * 2 + 1];
        assert!(user.html.contains("user-message"));
        assert!(user.html.contains(&format!(">{q}<")));
        assert!(answer.html.contains("bot-message"));
        assert!(answer.html.contains(&format!("answer to {q}")));
        assert!(answer.html.contains("badge-medium"));
    }

    // Node ids are unique and increase in render order.
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids, deduped);
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_sends_nothing() {
    let (backend, widget, panel) = setup(Duration::from_millis(10));
    let mut ops = panel.subscribe();

    assert_eq!(widget.submit("").await, SubmitOutcome::Skipped);
    assert_eq!(widget.submit("    ").await, SubmitOutcome::Skipped);

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert!(panel.nodes().is_empty());
    assert!(ops.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_widget_usable_after_timeout() {
    let backend = Arc::new(DelayedBackend {
        delay: Duration::from_secs(120),
        arrived: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let panel = Arc::new(MessagePanel::new(64));
    let widget = ChatWidget::new(
        Arc::clone(&backend) as Arc<dyn ChatTransport>,
        Arc::clone(&panel) as Arc<dyn RenderTarget>,
        WidgetOptions {
            assistant_name: "Askuno".to_string(),
            request_timeout: Some(Duration::from_secs(5)),
        },
    );

    assert_eq!(widget.submit("slow").await, SubmitOutcome::Errored);
    assert_eq!(widget.state(), WidgetState::Idle);
    assert!(!panel.contains(TYPING_INDICATOR_ID));

    // A second attempt is accepted and also bounded.
    assert_eq!(widget.submit("slow again").await, SubmitOutcome::Errored);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    assert_eq!(panel.nodes().len(), 4);
}
