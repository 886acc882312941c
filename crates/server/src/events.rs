// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue notifications.
//!
//! Producers announce a new mutation with `QueueEvent::Queued`; this is the
//! ping that wakes a waiting worker. The worker announces every applied
//! mutation with `QueueEvent::Processed`, which lets a waiting request answer
//! before its next poll.
//!
//! Events are hints. A missed event costs at most one wait interval: the
//! worker also drains on a timer and requests always re-check the queue row.
//! Events are also streamed to websocket clients at `/events`.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events buffered per subscriber; slow subscribers lose the oldest.
const EVENT_BUFFER_SIZE: usize = 256;

/// Something happened to the mutation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A mutation was queued.
    Queued {
        /// The queue row.
        mutatie_id: i64,
    },
    /// A mutation was applied.
    Processed {
        /// The queue row.
        mutatie_id: i64,
        /// Its stored code.
        kind: String,
        /// The competition it changed.
        competitie_id: Option<i64>,
    },
    /// Connection confirmation for websocket clients.
    Connected {
        /// Server time (ISO 8601).
        timestamp: String,
    },
}

/// Fan-out of queue events to the worker, waiting requests and websocket clients.
#[derive(Debug, Clone)]
pub struct QueueEvents {
    tx: broadcast::Sender<QueueEvent>,
}

impl QueueEvents {
    /// Creates a new channel without subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to every current subscriber.
    ///
    /// Without subscribers the event is dropped.
    pub fn broadcast(&self, event: &QueueEvent) {
        match self.tx.send(event.clone()) {
            Ok(receivers) => debug!(?event, receivers, "Broadcast queue event"),
            Err(_) => debug!(?event, "No receivers for queue event"),
        }
    }

    /// Subscribes to events sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}

impl Default for QueueEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for the next `Queued` event.
///
/// Returns `true` on a ping, including when events were lost to lag. A closed
/// channel never completes, so callers always wrap this in a timeout.
pub async fn wait_for_ping(rx: &mut broadcast::Receiver<QueueEvent>) -> bool {
    loop {
        match rx.recv().await {
            Ok(QueueEvent::Queued { .. }) | Err(broadcast::error::RecvError::Lagged(_)) => {
                return true;
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Waits until `mutatie_id` is announced as processed.
///
/// Lag also ends the wait: the caller re-checks the queue row anyway.
pub async fn wait_for_processed(rx: &mut broadcast::Receiver<QueueEvent>, mutatie_id: i64) {
    loop {
        match rx.recv().await {
            Ok(QueueEvent::Processed { mutatie_id: id, .. }) if id == mutatie_id => return,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Queue events lagged");
                return;
            }
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Upgrades the connection and streams queue events to the client.
pub async fn queue_events_handler(
    ws: WebSocketUpgrade,
    AxumState(events): AxumState<Arc<QueueEvents>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, events: Arc<QueueEvents>) {
    info!("Client connected to queue event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<QueueEvent> = events.subscribe();

    let connected: QueueEvent = QueueEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!(?e, "Failed to serialize queue event"),
            }
        }
    });

    // the stream is one-way; anything the client sends is ignored
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("Client disconnected from queue event stream");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::time::Duration;
    use tokio::time::{error::Elapsed, timeout};

    #[test]
    fn test_broadcast_without_receivers_is_dropped() {
        let events: QueueEvents = QueueEvents::new();
        events.broadcast(&QueueEvent::Queued { mutatie_id: 1 });
        assert_eq!(events.tx.receiver_count(), 0);
    }

    #[test]
    fn test_every_subscriber_receives_the_event() {
        let events: QueueEvents = QueueEvents::new();
        let mut rx1: broadcast::Receiver<QueueEvent> = events.subscribe();
        let mut rx2: broadcast::Receiver<QueueEvent> = events.subscribe();

        events.broadcast(&QueueEvent::Queued { mutatie_id: 7 });

        assert_eq!(rx1.try_recv().unwrap(), QueueEvent::Queued { mutatie_id: 7 });
        assert_eq!(rx2.try_recv().unwrap(), QueueEvent::Queued { mutatie_id: 7 });
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event: QueueEvent = QueueEvent::Processed {
            mutatie_id: 3,
            kind: String::from("CUT"),
            competitie_id: Some(1),
        };

        let json: String = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"processed","mutatie_id":3,"kind":"CUT","competitie_id":1}"#
        );
        assert_eq!(serde_json::from_str::<QueueEvent>(&json).unwrap(), event);
    }

    #[tokio::test]
    async fn test_wait_for_ping_skips_other_events() {
        let events: QueueEvents = QueueEvents::new();
        let mut rx: broadcast::Receiver<QueueEvent> = events.subscribe();

        events.broadcast(&QueueEvent::Processed {
            mutatie_id: 1,
            kind: String::from("CUT"),
            competitie_id: None,
        });
        events.broadcast(&QueueEvent::Queued { mutatie_id: 2 });

        let ping: bool = timeout(Duration::from_secs(1), wait_for_ping(&mut rx))
            .await
            .unwrap();
        assert!(ping);
    }

    #[tokio::test]
    async fn test_wait_for_processed_matches_the_mutation() {
        let events: QueueEvents = QueueEvents::new();
        let mut rx: broadcast::Receiver<QueueEvent> = events.subscribe();

        events.broadcast(&QueueEvent::Processed {
            mutatie_id: 1,
            kind: String::from("CUT"),
            competitie_id: None,
        });

        let andere: Result<(), Elapsed> =
            timeout(Duration::from_millis(50), wait_for_processed(&mut rx, 2)).await;
        assert!(andere.is_err());

        events.broadcast(&QueueEvent::Processed {
            mutatie_id: 2,
            kind: String::from("CUT"),
            competitie_id: None,
        });
        timeout(Duration::from_secs(1), wait_for_processed(&mut rx, 2))
            .await
            .unwrap();
    }
}
