use crate::channel::WebSocketChannel;
use crate::types::{ProgressEvent, Report, ResearchTask};
use crate::AppState;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

/// Upgrade handler for the `/ws` research protocol.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection protocol loop. Frames beginning with `start` carry a
/// research request; each request runs one pipeline, streaming progress
/// frames back in emission order and terminating with a `path` frame. A
/// disconnect gets one best-effort `error` frame and does not cancel a run
/// already in flight.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut source) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<ProgressEvent>();

    // Single writer task owns the sink so stages never interleave frames.
    let writer = tokio::spawn(async move {
        while let Some(event) = frame_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = source.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        if !text.starts_with("start") {
            continue;
        }

        let Some(task) = parse_start_command(&text) else {
            tracing::warn!("ignoring start command: not enough parameters provided");
            continue;
        };

        let verbose = state
            .config
            .bus
            .as_ref()
            .is_some_and(|bus| bus.verbose_logging);
        let channel = WebSocketChannel::new(frame_tx.clone(), verbose);
        let terminal = match state.pipeline.run(&task, &channel).await {
            Ok(Report::Completed(report)) => match state.renderer.render(&report).await {
                Ok(path) => ProgressEvent::path(path),
                Err(e) => ProgressEvent::error(format!("ERROR: {}", e)),
            },
            Ok(Report::Failed(diagnostic)) => ProgressEvent::error(diagnostic),
            Err(e) => ProgressEvent::error(format!("ERROR: {}", e)),
        };

        if frame_tx.send(terminal).is_err() {
            break;
        }
    }

    // Best-effort disconnect notice; the connection is usually gone.
    let _ = frame_tx.send(ProgressEvent::error("Error: websocket disconnected."));
    drop(frame_tx);
    let _ = writer.await;
}

/// Parse a `start{json}` command frame into a validated task. Missing or
/// empty `task`/`report_type` yields `None`; the caller logs and ignores.
fn parse_start_command(frame: &str) -> Option<ResearchTask> {
    let payload = frame.strip_prefix("start")?.trim_start();
    let task: ResearchTask = serde_json::from_str(payload).ok()?;
    task.validate().ok()?;
    Some(task)
}
