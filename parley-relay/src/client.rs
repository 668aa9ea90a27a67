use crate::protocol::{ClientFrame, ServerFrame};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use parley_core::model::{ParticipantId, RequestId, Room, RoomId, SignalEnvelope, SignalPayload};
use parley_session::{EndTransition, Mailbox, RelayError, RoomStore, SignalSubscription};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct ClientShared {
    pending: DashMap<RequestId, oneshot::Sender<ServerFrame>>,
    subscriptions: DashMap<RoomId, Vec<mpsc::UnboundedSender<SignalEnvelope>>>,
}

/// Клиент ws-реле: `Mailbox` и `RoomStore` поверх одного WebSocket
/// соединения. Ответы сопоставляются с запросами по `req_id`, доставка
/// подписок раскладывается по локальным получателям.
pub struct RemoteRelay {
    tx: mpsc::UnboundedSender<Message>,
    shared: Arc<ClientShared>,
}

impl RemoteRelay {
    /// Подключиться к реле по ws-адресу.
    pub async fn connect(url: &str) -> Result<Self, RelayError> {
        info!("Connecting to relay: {}", url);
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| RelayError::Unavailable(format!("failed to connect: {e}")))?;

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(ClientShared {
            pending: DashMap::new(),
            subscriptions: DashMap::new(),
        });

        tokio::spawn(Self::sender_task(write, rx));
        tokio::spawn(Self::receiver_task(read, shared.clone()));

        Ok(Self { tx, shared })
    }

    async fn sender_task(
        mut write: futures::stream::SplitSink<WsStream, Message>,
        mut rx: mpsc::UnboundedReceiver<Message>,
    ) {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = write.send(msg).await {
                error!("Failed to send relay frame: {}", e);
                break;
            }
        }
    }

    async fn receiver_task(
        mut read: futures::stream::SplitStream<WsStream>,
        shared: Arc<ClientShared>,
    ) {
        while let Some(msg) = read.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    error!("Relay socket error: {}", e);
                    break;
                }
            };
            match msg {
                Message::Text(text) => match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(frame) => Self::dispatch(&shared, frame),
                    Err(e) => warn!("Invalid server frame: {:?}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }

        // Сокет закрыт: хвостовые запросы получают ошибку, подписки закрываются.
        shared.pending.clear();
        shared.subscriptions.clear();
    }

    fn dispatch(shared: &ClientShared, frame: ServerFrame) {
        if let ServerFrame::Delivery { envelope } = frame {
            if let Some(mut subs) = shared.subscriptions.get_mut(&envelope.room_id) {
                subs.retain(|tx| tx.send(envelope.clone()).is_ok());
            }
            return;
        }

        let Some(req_id) = frame.request_id().cloned() else {
            warn!("Server frame without request id: {:?}", frame);
            return;
        };
        match shared.pending.remove(&req_id) {
            Some((_, tx)) => {
                let _ = tx.send(frame);
            }
            None => debug!("No pending request for {:?}", req_id),
        }
    }

    fn unregister_subscription(
        &self,
        room_id: &RoomId,
        tx: &mpsc::UnboundedSender<SignalEnvelope>,
    ) {
        if let Some(mut subs) = self.shared.subscriptions.get_mut(room_id) {
            subs.retain(|s| !s.same_channel(tx));
        }
    }

    async fn request(&self, frame: ClientFrame) -> Result<ServerFrame, RelayError> {
        let req_id = frame.request_id().clone();
        let (tx, rx) = oneshot::channel();
        self.shared.pending.insert(req_id.clone(), tx);

        let json = serde_json::to_string(&frame)
            .map_err(|e| RelayError::Unavailable(format!("failed to encode frame: {e}")))?;
        if self.tx.send(Message::Text(json)).is_err() {
            self.shared.pending.remove(&req_id);
            return Err(RelayError::ConnectionClosed);
        }

        match rx.await {
            Ok(ServerFrame::Error { message, .. }) => Err(RelayError::Unavailable(message)),
            Ok(frame) => Ok(frame),
            Err(_) => Err(RelayError::ConnectionClosed),
        }
    }
}

fn unexpected(frame: ServerFrame) -> RelayError {
    RelayError::Unavailable(format!("unexpected relay response: {frame:?}"))
}

#[async_trait]
impl Mailbox for RemoteRelay {
    async fn append(
        &self,
        room_id: &RoomId,
        sender: &ParticipantId,
        payload: SignalPayload,
    ) -> Result<SignalEnvelope, RelayError> {
        let frame = self
            .request(ClientFrame::Append {
                req_id: RequestId::new(),
                room_id: room_id.clone(),
                sender: sender.clone(),
                payload,
            })
            .await?;
        match frame {
            ServerFrame::Appended { envelope, .. } => Ok(envelope),
            other => Err(unexpected(other)),
        }
    }

    async fn history(&self, room_id: &RoomId) -> Result<Vec<SignalEnvelope>, RelayError> {
        let frame = self
            .request(ClientFrame::History {
                req_id: RequestId::new(),
                room_id: room_id.clone(),
            })
            .await?;
        match frame {
            ServerFrame::HistorySnapshot { entries, .. } => Ok(entries),
            other => Err(unexpected(other)),
        }
    }

    async fn subscribe(&self, room_id: &RoomId) -> Result<SignalSubscription, RelayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Получатель регистрируется до подтверждения, чтобы не потерять
        // доставку, начавшуюся сразу после оформления подписки. Неудачная
        // подписка снимает его обратно.
        self.shared
            .subscriptions
            .entry(room_id.clone())
            .or_default()
            .push(tx.clone());

        let frame = match self
            .request(ClientFrame::Subscribe {
                req_id: RequestId::new(),
                room_id: room_id.clone(),
            })
            .await
        {
            Ok(frame) => frame,
            Err(e) => {
                self.unregister_subscription(room_id, &tx);
                return Err(e);
            }
        };
        match frame {
            ServerFrame::Subscribed { .. } => Ok(SignalSubscription::new(room_id.clone(), rx)),
            other => {
                self.unregister_subscription(room_id, &tx);
                Err(unexpected(other))
            }
        }
    }
}

#[async_trait]
impl RoomStore for RemoteRelay {
    async fn insert_room(
        &self,
        creator: &ParticipantId,
        duration_minutes: u32,
    ) -> Result<Room, RelayError> {
        let frame = self
            .request(ClientFrame::CreateRoom {
                req_id: RequestId::new(),
                creator: creator.clone(),
                duration_minutes,
            })
            .await?;
        match frame {
            ServerFrame::RoomCreated { room, .. } => Ok(room),
            other => Err(unexpected(other)),
        }
    }

    async fn fetch_room(&self, room_id: &RoomId) -> Result<Option<Room>, RelayError> {
        let frame = self
            .request(ClientFrame::FetchRoom {
                req_id: RequestId::new(),
                room_id: room_id.clone(),
            })
            .await?;
        match frame {
            ServerFrame::RoomFetched { room, .. } => Ok(room),
            other => Err(unexpected(other)),
        }
    }

    async fn end_room(
        &self,
        room_id: &RoomId,
        ended_at: SystemTime,
    ) -> Result<Option<EndTransition>, RelayError> {
        let frame = self
            .request(ClientFrame::EndRoom {
                req_id: RequestId::new(),
                room_id: room_id.clone(),
                ended_at,
            })
            .await?;
        match frame {
            ServerFrame::RoomEnded { transition, .. } => Ok(transition),
            other => Err(unexpected(other)),
        }
    }
}
