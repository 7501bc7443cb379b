use capture_relay_common::models::SessionCounters;
use capture_relay_common::{
    ConnectionSession, MessageId, RelayError, RelayMessage, RelayResponse, current_timestamp_millis,
};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::dispatch::CommandRelay;

/// Serve an external peer until its channel closes
///
/// Every text frame is handled in its own task, so responses leave in
/// completion order and are correlated by id only.
pub async fn run_external_session<S>(
    mut read: S,
    outgoing_tx: mpsc::Sender<WsMessage>,
    relay: Arc<CommandRelay>,
    session: &mut ConnectionSession,
) where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    info!(
        "External session {} opened from {}",
        session.session_id, session.peer
    );
    let counters = session.counters();

    while let Some(message) = read.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                counters.record_received();
                dispatch_text_message(&text, &outgoing_tx, &relay, &counters);
            }
            Ok(WsMessage::Binary(_)) => {
                warn!("Received unexpected binary message");
            }
            Ok(WsMessage::Ping(data)) => {
                debug!("Received WebSocket ping");
                if let Err(e) = outgoing_tx.send(WsMessage::Pong(data)).await {
                    error!("Failed to send pong: {}", e);
                    break;
                }
            }
            Ok(WsMessage::Pong(_)) => {
                debug!("Received WebSocket pong");
            }
            Ok(WsMessage::Close(_)) => {
                info!("Peer closed session {}", session.session_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    session.close();
    info!(
        "External session {} closed after {}ms: {} received, {} responded, {} dropped",
        session.session_id,
        session.age_millis(current_timestamp_millis()),
        counters.received(),
        counters.responded(),
        counters.dropped()
    );
}

/// Decode one frame and spawn its handler
fn dispatch_text_message(
    text: &str,
    outgoing_tx: &mpsc::Sender<WsMessage>,
    relay: &Arc<CommandRelay>,
    counters: &Arc<SessionCounters>,
) {
    let outgoing_tx = outgoing_tx.clone();
    let counters = Arc::clone(counters);

    match decode_relay_message(text) {
        Ok(message) => {
            let relay = Arc::clone(relay);
            tokio::spawn(async move {
                let response = relay.handle(message).await;
                send_response(&outgoing_tx, &response, &counters).await;
            });
        }
        Err(response) => {
            tokio::spawn(async move {
                send_response(&outgoing_tx, &response, &counters).await;
            });
        }
    }
}

/// Parse a text frame into a relay message
///
/// The id is recovered from any JSON object so the error reply stays
/// correlated; only frames that are not objects are answered with a `null` id.
fn decode_relay_message(text: &str) -> Result<RelayMessage, RelayResponse> {
    let invalid = |id: MessageId, reason: String| {
        warn!("Failed to parse relay message: {}", reason);
        RelayResponse::from_outcome(id, Err(RelayError::InvalidMessage(reason)))
    };

    let value: Value =
        serde_json::from_str(text).map_err(|e| invalid(MessageId::default(), e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(invalid(
            MessageId::default(),
            "expected a JSON object".to_string(),
        ));
    };

    let id = MessageId(fields.get("id").cloned().unwrap_or_default());
    serde_json::from_value(Value::Object(fields)).map_err(|e| invalid(id, e.to_string()))
}

/// Queue a response for the writer
///
/// A closed channel means the peer is gone; the response is dropped,
/// logged at debug level and counted.
pub async fn send_response(
    outgoing_tx: &mpsc::Sender<WsMessage>,
    response: &RelayResponse,
    counters: &SessionCounters,
) {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize response {}: {}", response.id(), e);
            counters.record_dropped();
            return;
        }
    };

    if outgoing_tx.send(WsMessage::Text(json.into())).await.is_err() {
        debug!("Channel closed, dropping response {}", response.id());
        counters.record_dropped();
    } else {
        counters.record_responded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_relay_common::{InternalBus, generate_session_id};
    use serde_json::{Value, json};
    use std::time::Duration;

    const BASE_URL: &str = "ext://abc/";

    fn text(value: Value) -> Result<WsMessage, WsError> {
        Ok(WsMessage::Text(value.to_string().into()))
    }

    fn session() -> ConnectionSession {
        ConnectionSession::new(
            generate_session_id(),
            "127.0.0.1:40000".to_string(),
            current_timestamp_millis(),
        )
    }

    async fn next_json(rx: &mut mpsc::Receiver<WsMessage>) -> Value {
        match rx.recv().await {
            Some(WsMessage::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_answers_and_closes() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![
            text(json!({"id": 7, "cmd": "getBaseUrl", "args": {}})),
            text(json!({"id": 8, "cmd": "bogus", "args": {}})),
        ]);

        let mut session = session();
        run_external_session(read, tx, relay, &mut session).await;
        assert!(!session.is_open());

        let mut responses = vec![next_json(&mut rx).await, next_json(&mut rx).await];
        responses.sort_by_key(|r| r["id"].as_u64());

        assert_eq!(responses[0], json!({"id": 7, "response": {"url": BASE_URL}}));
        assert_eq!(
            responses[1],
            json!({"id": 8, "error": {"message": "Unsupported command: bogus"}})
        );

        let counters = session.counters();
        assert_eq!(counters.received(), 2);
        assert_eq!(counters.responded(), 2);
        assert_eq!(counters.dropped(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_gets_null_id_error() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![Ok::<_, WsError>(WsMessage::Text(
            "{not json".to_string().into(),
        ))]);

        run_external_session(read, tx, relay, &mut session()).await;

        let response = next_json(&mut rx).await;
        assert_eq!(response["id"], Value::Null);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid message format")
        );
    }

    #[tokio::test]
    async fn test_wrongly_typed_cmd_keeps_id() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![
            text(json!({"id": 5, "cmd": 42, "args": {}})),
            text(json!({"id": 6, "cmd": null})),
        ]);

        run_external_session(read, tx, relay, &mut session()).await;

        let mut responses = vec![next_json(&mut rx).await, next_json(&mut rx).await];
        responses.sort_by_key(|r| r["id"].as_u64());

        assert_eq!(
            responses[0],
            json!({"id": 5, "error": {"message": "Unsupported command: 42"}})
        );
        assert_eq!(
            responses[1],
            json!({"id": 6, "error": {"message": "Unsupported command: null"}})
        );
    }

    #[tokio::test]
    async fn test_non_object_frame_gets_null_id_error() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![text(json!([1, "getBaseUrl"]))]);

        run_external_session(read, tx, relay, &mut session()).await;

        assert_eq!(
            next_json(&mut rx).await,
            json!({"id": null, "error": {"message": "Invalid message format: expected a JSON object"}})
        );
    }

    #[tokio::test]
    async fn test_responses_follow_completion_order() {
        let bus = InternalBus::new();
        let (_, mut contexts) = bus.subscribe().await;
        tokio::spawn(async move {
            while let Some(envelope) = contexts.recv().await {
                tokio::time::sleep(Duration::from_millis(200)).await;
                envelope.responder.respond(json!({"done": true}));
            }
        });

        let relay = Arc::new(CommandRelay::new(BASE_URL, bus));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![
            text(json!({"id": 1, "cmd": "relayMessage", "args": {"cmd": "slow", "args": {}}})),
            text(json!({"id": 2, "cmd": "getBaseUrl", "args": {}})),
        ]);

        run_external_session(read, tx, relay, &mut session()).await;

        assert_eq!(next_json(&mut rx).await["id"], 2);
        assert_eq!(
            next_json(&mut rx).await,
            json!({"id": 1, "response": {"done": true}})
        );
    }

    #[tokio::test]
    async fn test_ping_is_answered() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![Ok::<_, WsError>(WsMessage::Ping(
            vec![1u8, 2].into(),
        ))]);

        run_external_session(read, tx, relay, &mut session()).await;

        match rx.recv().await {
            Some(WsMessage::Pong(data)) => assert_eq!(&data[..], &[1u8, 2][..]),
            other => panic!("Expected pong, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_messages_after_close_are_ignored() {
        let relay = Arc::new(CommandRelay::new(BASE_URL, InternalBus::new()));
        let (tx, mut rx) = mpsc::channel(16);
        let read = futures_util::stream::iter(vec![
            Ok::<_, WsError>(WsMessage::Close(None)),
            text(json!({"id": 1, "cmd": "getBaseUrl"})),
        ]);

        let mut session = session();
        run_external_session(read, tx, relay, &mut session).await;

        assert_eq!(session.counters().received(), 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_response_counts_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let counters = SessionCounters::default();

        let response = RelayResponse::from_outcome(MessageId::from(1), Ok(json!(true)));
        send_response(&tx, &response, &counters).await;

        assert_eq!(counters.dropped(), 1);
        assert_eq!(counters.responded(), 0);
    }
}
