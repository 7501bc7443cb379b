use capture_relay_common::{ContextFrame, Envelope, InternalBus, Responder};
use futures_util::{Stream, StreamExt};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, error, info, warn};

/// Serve an internal context: forward bus broadcasts, settle them from replies
///
/// Broadcasts still pending when the context disconnects are declined.
pub async fn run_context_session<S>(
    mut read: S,
    outgoing_tx: mpsc::Sender<WsMessage>,
    bus: InternalBus,
    peer: &str,
) where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let (subscriber, mut envelopes) = bus.subscribe().await;
    info!("Internal context {} attached from {}", subscriber, peer);

    let mut pending: HashMap<u64, Responder> = HashMap::new();
    let mut next_seq: u64 = 0;

    loop {
        tokio::select! {
            envelope = envelopes.recv() => {
                let Some(Envelope { message, responder }) = envelope else {
                    break;
                };

                let seq = next_seq;
                next_seq += 1;

                let frame = ContextFrame::Broadcast { seq, message };
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize broadcast {}: {}", seq, e);
                        continue;
                    }
                };

                prune_settled(&mut pending);
                pending.insert(seq, responder);
                if outgoing_tx.send(WsMessage::Text(json.into())).await.is_err() {
                    debug!("Context {} writer closed", subscriber);
                    break;
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_context_frame(&text, &mut pending);
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        if outgoing_tx.send(WsMessage::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!("Context {} closed", subscriber);
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("Context {} WebSocket error: {}", subscriber, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    bus.unsubscribe(subscriber).await;
    info!(
        "Internal context {} detached, declining {} pending broadcast(s)",
        subscriber,
        pending.len()
    );
}

/// Forget broadcasts another context has already settled
fn prune_settled(pending: &mut HashMap<u64, Responder>) {
    let before = pending.len();
    pending.retain(|_, responder| !responder.is_settled());
    if pending.len() < before {
        debug!("Dropped {} settled broadcast(s)", before - pending.len());
    }
}

/// Apply a reply or decline from the context to its pending broadcast
fn handle_context_frame(text: &str, pending: &mut HashMap<u64, Responder>) {
    match serde_json::from_str::<ContextFrame>(text) {
        Ok(ContextFrame::Reply { seq, response }) => match pending.remove(&seq) {
            Some(responder) => {
                if !responder.respond(response) {
                    debug!("Broadcast {} was already settled", seq);
                }
            }
            None => warn!("Reply for unknown broadcast {}", seq),
        },
        Ok(ContextFrame::Decline { seq }) => {
            if pending.remove(&seq).is_none() {
                warn!("Decline for unknown broadcast {}", seq);
            }
        }
        Ok(ContextFrame::Broadcast { .. }) => {
            warn!("Context sent a broadcast frame; ignoring");
        }
        Err(e) => {
            warn!("Failed to parse context frame: {}", e);
        }
    }
}
