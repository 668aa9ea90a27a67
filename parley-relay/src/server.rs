use crate::protocol::{ClientFrame, ServerFrame};
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use parley_session::{Mailbox, MemoryRelay, RoomStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Состояние реле: общий журнал и записи комнат для всех соединений.
#[derive(Clone)]
pub struct RelayState {
    relay: Arc<MemoryRelay>,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            relay: Arc::new(MemoryRelay::new()),
        }
    }

    pub fn with_relay(relay: Arc<MemoryRelay>) -> Self {
        Self { relay }
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    info!("New relay connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let tx = tx.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => handle_frame(&state, &tx, frame).await,
                        Err(e) => {
                            warn!("Invalid client frame: {:?}", e);
                            send_frame(
                                &tx,
                                &ServerFrame::Error {
                                    req_id: None,
                                    message: format!("invalid frame: {e}"),
                                },
                            );
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    info!("Relay connection closed");
}

async fn handle_frame(state: &RelayState, tx: &mpsc::UnboundedSender<Message>, frame: ClientFrame) {
    match frame {
        ClientFrame::CreateRoom {
            req_id,
            creator,
            duration_minutes,
        } => match state.relay.insert_room(&creator, duration_minutes).await {
            Ok(room) => send_frame(tx, &ServerFrame::RoomCreated { req_id, room }),
            Err(e) => send_frame(
                tx,
                &ServerFrame::Error {
                    req_id: Some(req_id),
                    message: e.to_string(),
                },
            ),
        },

        ClientFrame::FetchRoom { req_id, room_id } => {
            match state.relay.fetch_room(&room_id).await {
                Ok(room) => send_frame(tx, &ServerFrame::RoomFetched { req_id, room }),
                Err(e) => send_frame(
                    tx,
                    &ServerFrame::Error {
                        req_id: Some(req_id),
                        message: e.to_string(),
                    },
                ),
            }
        }

        ClientFrame::EndRoom {
            req_id,
            room_id,
            ended_at,
        } => match state.relay.end_room(&room_id, ended_at).await {
            Ok(transition) => send_frame(tx, &ServerFrame::RoomEnded { req_id, transition }),
            Err(e) => send_frame(
                tx,
                &ServerFrame::Error {
                    req_id: Some(req_id),
                    message: e.to_string(),
                },
            ),
        },

        ClientFrame::Append {
            req_id,
            room_id,
            sender,
            payload,
        } => match state.relay.append(&room_id, &sender, payload).await {
            Ok(envelope) => send_frame(tx, &ServerFrame::Appended { req_id, envelope }),
            Err(e) => send_frame(
                tx,
                &ServerFrame::Error {
                    req_id: Some(req_id),
                    message: e.to_string(),
                },
            ),
        },

        ClientFrame::History { req_id, room_id } => match state.relay.history(&room_id).await {
            Ok(entries) => send_frame(tx, &ServerFrame::HistorySnapshot { req_id, entries }),
            Err(e) => send_frame(
                tx,
                &ServerFrame::Error {
                    req_id: Some(req_id),
                    message: e.to_string(),
                },
            ),
        },

        ClientFrame::Subscribe { req_id, room_id } => {
            match state.relay.subscribe(&room_id).await {
                Ok(mut subscription) => {
                    send_frame(tx, &ServerFrame::Subscribed { req_id });

                    // Пересылка живет, пока открыты и подписка, и сокет.
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        while let Some(envelope) = subscription.recv().await {
                            let frame = ServerFrame::Delivery { envelope };
                            match serde_json::to_string(&frame) {
                                Ok(json) => {
                                    if tx.send(Message::Text(json.into())).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => error!("Failed to serialize delivery: {}", e),
                            }
                        }
                    });
                }
                Err(e) => send_frame(
                    tx,
                    &ServerFrame::Error {
                        req_id: Some(req_id),
                        message: e.to_string(),
                    },
                ),
            }
        }
    }
}

fn send_frame(tx: &mpsc::UnboundedSender<Message>, frame: &ServerFrame) {
    match serde_json::to_string(frame) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => error!("Failed to serialize server frame: {}", e),
    }
}
