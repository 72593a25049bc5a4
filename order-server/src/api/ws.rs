//! Realtime WebSocket endpoint
//!
//! GET /ws
//!
//! Protocol (JSON text frames):
//! - Server → client: [`LiveEvent`] (`ready`, `order-created`, `order-status-changed`)
//! - Client → server: [`LiveCommand`] (`join-table-group`, `leave-table-group`)
//!
//! No replay: after `ready` the client fetches `GET /api/orders` to reconcile.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::{Sink, SinkExt, StreamExt};
use shared::message::{LiveCommand, LiveEvent, ReadyPayload};
use std::time::Duration;

use crate::core::ServerState;
use crate::live::{LiveOrderHub, Subscription};

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_live_ws))
}

async fn handle_live_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_ws_session(socket, state))
}

async fn live_ws_session(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();
    let Subscription { id, mut receiver } = state.hub.register();
    let send_timeout = state.live_send_timeout();
    let shutdown = state.shutdown_token();

    tracing::info!(subscriber_id = id, "Live WS connected");

    let ready = LiveEvent::Ready(ReadyPayload { subscriber_id: id });
    if send_event(&mut sink, &ready, send_timeout).await.is_ok() {
        let mut ping_interval = tokio::time::interval(PING_INTERVAL);
        ping_interval.tick().await; // skip immediate

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = tokio::time::timeout(send_timeout, sink.send(Message::Close(None))).await;
                    break;
                }

                _ = ping_interval.tick() => {
                    if send_frame(&mut sink, Message::Ping(vec![].into()), send_timeout).await.is_err() {
                        break;
                    }
                }

                event = receiver.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(reason) = send_event(&mut sink, &event, send_timeout).await {
                                tracing::info!(subscriber_id = id, reason, "Live WS write failed, closing");
                                break;
                            }
                        }
                        // deregistered by the hub
                        None => break,
                    }
                }

                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => handle_command(&state.hub, id, text.as_str()),
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(subscriber_id = id, error = %e, "Live WS read error");
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    state.hub.deregister(id);
    tracing::info!(subscriber_id = id, "Live WS disconnected");
}

fn handle_command(hub: &LiveOrderHub, id: u64, text: &str) {
    match serde_json::from_str::<LiveCommand>(text) {
        Ok(LiveCommand::JoinTableGroup { table }) => {
            hub.join_group(id, &table);
        }
        Ok(LiveCommand::LeaveTableGroup { table }) => {
            hub.leave_group(id, &table);
        }
        Err(e) => {
            tracing::debug!(subscriber_id = id, error = %e, "Ignoring unknown live command");
        }
    }
}

async fn send_event<S>(sink: &mut S, event: &LiveEvent, timeout: Duration) -> Result<(), &'static str>
where
    S: Sink<Message> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| "serialize")?;
    send_frame(sink, Message::Text(json.into()), timeout).await
}

async fn send_frame<S>(sink: &mut S, frame: Message, timeout: Duration) -> Result<(), &'static str>
where
    S: Sink<Message> + Unpin,
{
    match tokio::time::timeout(timeout, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err("closed"),
        Err(_) => Err("timeout"),
    }
}
