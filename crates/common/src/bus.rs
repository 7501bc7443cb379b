//! Internal broadcast bus
//!
//! Every extension-owned context subscribes to the bus. A broadcast hands
//! each live subscriber an [`Envelope`] carrying the message and a
//! [`Responder`]. The first responder to reply settles the broadcast; a
//! subscriber declines by dropping its responder. When every subscriber has
//! declined, or none exists, the broadcast fails with
//! [`RelayError::NoReceiver`]. There is no timeout: a subscriber that holds
//! its responder forever stalls the broadcast. A subscriber whose queue is
//! full is skipped for that broadcast, as if it had declined, so a stuck
//! context never holds up delivery to the others.

use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::constants::CONTEXT_CHANNEL_CAPACITY;
use crate::error::{RelayError, Result};
use crate::protocol::InternalMessage;

/// Identifier handed out by [`InternalBus::subscribe`]
pub type SubscriberId = u64;

/// One broadcast as seen by one subscriber
#[derive(Debug)]
pub struct Envelope {
    pub message: InternalMessage,
    pub responder: Responder,
}

/// Settles a broadcast; dropping it without replying declines
#[derive(Debug)]
pub struct Responder {
    reply_tx: mpsc::Sender<Value>,
}

impl Responder {
    /// Offer `value` as the broadcast result
    ///
    /// Returns `false` when the broadcast is no longer waiting, usually
    /// because another context settled it first.
    pub fn respond(self, value: Value) -> bool {
        self.reply_tx.try_send(value).is_ok()
    }

    /// Explicitly decline the broadcast
    pub fn decline(self) {}

    /// Whether the broadcast has already completed, settled by another
    /// context or failed for want of one
    pub fn is_settled(&self) -> bool {
        self.reply_tx.is_closed()
    }
}

struct Subscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Envelope>,
}

#[derive(Default)]
struct BusInner {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

/// Fan-out to every subscriber, fan-in of the first settled reply
#[derive(Clone, Default)]
pub struct InternalBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for InternalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalBus").finish_non_exhaustive()
    }
}

impl InternalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context; envelopes arrive on the returned receiver
    pub async fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(CONTEXT_CHANNEL_CAPACITY);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        self.inner
            .subscribers
            .lock()
            .await
            .push(Subscriber { id, tx });

        debug!(subscriber = id, "Internal context subscribed");
        (id, rx)
    }

    /// Remove a context. Envelopes it still holds decline when dropped.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        self.inner
            .subscribers
            .lock()
            .await
            .retain(|s| s.id != id);

        debug!(subscriber = id, "Internal context unsubscribed");
    }

    /// Number of live subscribers
    pub async fn subscriber_count(&self) -> usize {
        let mut subscribers = self.inner.subscribers.lock().await;
        subscribers.retain(|s| !s.tx.is_closed());
        subscribers.len()
    }

    /// Send `message` to every subscriber and wait for the first reply
    pub async fn broadcast(&self, message: InternalMessage) -> Result<Value> {
        let targets: Vec<(SubscriberId, mpsc::Sender<Envelope>)> = {
            let mut subscribers = self.inner.subscribers.lock().await;
            subscribers.retain(|s| !s.tx.is_closed());
            subscribers.iter().map(|s| (s.id, s.tx.clone())).collect()
        };

        if targets.is_empty() {
            return Err(RelayError::NoReceiver);
        }

        let (reply_tx, mut reply_rx) = mpsc::channel(targets.len());
        let mut delivered = 0usize;

        for (id, tx) in targets {
            let envelope = Envelope {
                message: message.clone(),
                responder: Responder {
                    reply_tx: reply_tx.clone(),
                },
            };
            match tx.try_send(envelope) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = id, "Internal context backlogged, skipping broadcast");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        drop(reply_tx);

        debug!(cmd = %message.cmd, delivered, "Broadcast delivered");

        reply_rx.recv().await.ok_or(RelayError::NoReceiver)
    }
}
