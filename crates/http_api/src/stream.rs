use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use app_api::StreamMessage;

use crate::state::HttpState;

pub async fn stream(State(state): State<HttpState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn initial_frames(state: &HttpState) -> Vec<StreamMessage> {
    let ctx = state.context.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        let initial = app_api::stream_initial(&ctx);
        let tokens = app_api::stream_token_usage(&ctx);
        (initial, tokens)
    })
    .await;
    let mut frames = Vec::with_capacity(2);
    match loaded {
        Ok((initial, tokens)) => {
            match initial {
                Ok(frame) => frames.push(frame),
                Err(err) => warn!(error = %err, "failed to load recent events for stream"),
            }
            frames.extend(tokens);
        }
        Err(err) => warn!(error = %err, "stream setup task failed"),
    }
    frames
}

async fn handle_socket(socket: WebSocket, state: HttpState) {
    // Subscribe first so nothing published during setup is lost.
    let mut subscription = state.broadcaster.subscribe();
    info!(
        subscribers = state.broadcaster.subscriber_count(),
        "stream client connected"
    );
    let (mut sender, mut receiver) = socket.split();

    for frame in initial_frames(&state).await {
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "failed to encode initial frame");
                continue;
            }
        };
        if sender.send(Message::Text(text)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            frame = subscription.recv() => match frame {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "stream client lagging; frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(message)) => debug!(?message, "ignoring stream client message"),
                Some(Err(err)) => {
                    debug!(error = %err, "stream client error");
                    break;
                }
            },
        }
    }

    drop(subscription);
    info!("stream client disconnected");
}
