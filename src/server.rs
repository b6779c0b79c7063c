//! HTTP host for the chat widget.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use futures::{Stream, StreamExt, future, stream};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::events::{reset_event, resync_event, sse_event};
use crate::page::{chat_content, html_shell};
use crate::session::{WidgetSession, WidgetStore};
use crate::widget::{
    ChatRequest, ChatTransport, HttpTransport, RenderOp, SubmitOutcome, WidgetState,
};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.backend.base_url, &config.backend.chat_path)?;

    info!(
        name: "backend.config.loaded",
        endpoint = %transport.endpoint(),
        timeout_secs = config.backend.request_timeout_secs,
        "Backend configuration loaded"
    );

    let transport: Arc<dyn ChatTransport> = Arc::new(transport);
    let state = build_state(Arc::clone(&config), transport);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Assemble shared state around a backend transport.
pub fn build_state(config: Arc<AppConfig>, transport: Arc<dyn ChatTransport>) -> AppState {
    let sessions = WidgetStore::new(
        transport,
        config.widget_options(),
        config.widget.event_buffer,
        config.session_idle(),
    );
    AppState { sessions, config }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/chat/{id}", get(chat_page_handler))
        .route("/chat/{id}/submit", post(submit_handler))
        .route("/chat/{id}/cancel", post(cancel_handler))
        .route("/chat/{id}/events", get(events_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Start a new widget session.
async fn index_handler(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create();
    tracing::debug!(session_id = %session.id(), "Created widget session");
    Redirect::to(&format!("/chat/{}", session.id()))
}

/// GET /chat/{id} - Render the widget page for a session.
async fn chat_page_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(session) = state.sessions.get(&id) else {
        // Unknown or pruned session: start over.
        return Redirect::to("/").into_response();
    };

    let name = &state.config.widget.assistant_name;
    let content = chat_content(session.id(), name, &session.panel().html());
    Html(html_shell(name, &content)).into_response()
}

async fn health_handler() -> &'static str {
    "ok"
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Response from the submit endpoint.
#[derive(Debug, Serialize)]
struct SubmitResponse {
    outcome: SubmitOutcome,
}

/// Response from the cancel endpoint.
#[derive(Debug, Serialize)]
struct CancelResponse {
    state: WidgetState,
}

fn find_session(state: &AppState, id: &str) -> Result<WidgetSession, (StatusCode, String)> {
    state.sessions.get(id).ok_or_else(|| {
        tracing::warn!(session_id = %id, "Session not found");
        (StatusCode::NOT_FOUND, format!("Session not found: {id}"))
    })
}

/// POST /chat/{id}/submit - Run one submission through the widget.
async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    let session = find_session(&state, &id)?;

    tracing::info!(
        session_id = %id,
        message_length = req.message.len(),
        "Received widget submission"
    );

    // Run detached so a dropped connection cannot abandon the round trip.
    let widget = Arc::clone(session.widget());
    let outcome = tokio::spawn(async move { widget.submit(&req.message).await })
        .await
        .map_err(|e| {
            tracing::error!(session_id = %id, error = %e, "Submission task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Submission failed".to_string())
        })?;

    let status = match outcome {
        SubmitOutcome::Skipped => return Ok(StatusCode::NO_CONTENT.into_response()),
        SubmitOutcome::Busy => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };
    Ok((status, Json(SubmitResponse { outcome })).into_response())
}

/// POST /chat/{id}/cancel - Cancel the in-flight request, if any.
async fn cancel_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let session = find_session(&state, &id)?;

    if session.widget().cancel() {
        tracing::info!(session_id = %id, "Cancelled in-flight request");
        let body = CancelResponse {
            state: session.widget().state(),
        };
        Ok((StatusCode::ACCEPTED, Json(body)).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// GET /chat/{id}/events - SSE stream of render operations.
async fn events_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let session = find_session(&state, &id)?;

    tracing::info!(session_id = %id, "Starting render event stream");

    let (snapshot, rx) = session.panel().snapshot_and_subscribe();
    let stream = render_event_stream(&snapshot, rx).map(Ok::<String, Infallible>);

    Ok(build_sse_response(Body::from_stream(stream)))
}

/// A `reset` frame with `snapshot`, then one frame per op from `rx`.
///
/// A receiver that lagged gets a `resync` frame in place of the ops it missed.
fn render_event_stream(
    snapshot: &str,
    rx: broadcast::Receiver<RenderOp>,
) -> impl Stream<Item = String> + use<> {
    let ops = BroadcastStream::new(rx).map(|item| match item {
        Ok(op) => sse_event(&op),
        Err(BroadcastStreamRecvError::Lagged(missed)) => resync_event(missed),
    });
    stream::once(future::ready(reset_event(snapshot))).chain(ops)
}

fn build_sse_response(body: Body) -> Response {
    let mut resp = Response::new(body);
    let h = resp.headers_mut();
    h.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    h.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    h.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    resp
}
