//! Integration tests for the presence client components
//!
//! These tests validate cross-component interactions and real WebSocket behavior
//! against a scripted in-process server.

use assert_approx_eq::assert_approx_eq;
use client::app::App;
use client::config::ClientConfig;
use client::intent::{Direction, IntentDispatcher};
use client::network::{ChannelEvent, ConnectionHandle, MessageChannel};
use client::presence::{Applied, PresenceState};
use client::proximity::{compute_proximity, ProximityEngine};
use client::world::WorldStateStore;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use shared::{ClientMessage, PlayerId, PlayerRecord, ServerMessage};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;

/// WIRE PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Messages shaped like the server's output decode and apply
    #[test]
    fn server_shaped_messages_apply() {
        let mut presence = PresenceState::default();

        let join = json!({
            "type": "JOIN",
            "payload": {
                "your_id": "0f1c",
                "players": [{"id": "0f1c", "x": 0, "y": 0}]
            }
        });
        let world = json!({
            "type": "WORLD_STATE",
            "payload": {
                "players": [
                    {"id": "0f1c", "x": 0, "y": 0},
                    {"id": "77aa", "x": 40, "y": 30}
                ]
            }
        });

        assert_eq!(presence.handle_text(&join.to_string()), Applied::Joined);
        assert_eq!(presence.handle_text(&world.to_string()), Applied::Snapshot);

        assert_eq!(presence.store().len(), 2);
        assert!(presence.proximity().contains(&PlayerId::from("77aa")));
    }

    /// Servers that hand out integer ids are understood
    #[test]
    fn numeric_identities_apply() {
        let mut presence = PresenceState::default();

        let join = r#"{"type":"JOIN","payload":{"your_id":1,"players":[{"id":1,"x":0,"y":0},{"id":2,"x":30,"y":40}]}}"#;
        let world = r#"{"type":"WORLD_STATE","payload":{"players":[{"id":1,"x":5,"y":0},{"id":2,"x":300,"y":0}]}}"#;

        assert_eq!(presence.handle_text(join), Applied::Joined);
        assert_eq!(presence.store().local_id(), Some(&PlayerId::from("1")));
        assert!(presence.proximity().contains(&PlayerId::from("2")));

        assert_eq!(presence.handle_text(world), Applied::Snapshot);
        assert_eq!(presence.store().local_player(), Some(&PlayerRecord::new("1", 5.0, 0.0)));
        assert!(presence.proximity().is_empty());
    }

    /// The outbound move matches the server's expected payload shape
    #[test]
    fn move_request_shape() {
        let message = ClientMessage::Move { x: 100.5, y: -200.25 };
        let value: serde_json::Value = serde_json::from_str(&message.encode().unwrap()).unwrap();

        assert_eq!(value["type"], "MOVE");
        assert_approx_eq!(value["payload"]["x"].as_f64().unwrap(), 100.5, 1e-9);
        assert_approx_eq!(value["payload"]["y"].as_f64().unwrap(), -200.25, 1e-9);
    }

    /// Server messages survive encode and decode unchanged
    #[test]
    fn server_message_encoding_is_stable() {
        let message = ServerMessage::WorldState {
            players: vec![PlayerRecord::new("A", 1.5, 2.5)],
            your_id: Some(PlayerId::from("A")),
        };
        let decoded = ServerMessage::decode(&message.encode().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }
}

/// STATE RECONCILIATION TESTS
mod reconciliation_tests {
    use super::*;

    /// Join followed by an identity-less snapshot keeps the local identity
    #[test]
    fn identity_retention_scenario() {
        let mut store = WorldStateStore::new();
        store.apply_join(PlayerId::from("A"), vec![PlayerRecord::new("A", 0.0, 0.0)]);
        store.apply_snapshot(
            vec![PlayerRecord::new("A", 5.0, 0.0), PlayerRecord::new("B", 5.0, 5.0)],
            None,
        );

        assert_eq!(store.local_id(), Some(&PlayerId::from("A")));
        assert_eq!(store.local_player(), Some(&PlayerRecord::new("A", 5.0, 0.0)));
    }

    /// Moves are computed from the server's last word, not from prior requests
    #[test]
    fn moves_follow_confirmed_positions() {
        let mut presence = PresenceState::default();
        let dispatcher = IntentDispatcher::default();

        presence.apply_join(PlayerId::from("A"), vec![PlayerRecord::new("A", 10.0, 10.0)]);

        let first = dispatcher.on_directional_input(Direction::Up, presence.store());
        let second = dispatcher.on_directional_input(Direction::Up, presence.store());
        assert_eq!(first, Some(ClientMessage::Move { x: 10.0, y: 0.0 }));
        assert_eq!(first, second);

        // Server accepts the move and echoes it back
        presence.apply_snapshot(vec![PlayerRecord::new("A", 10.0, 0.0)], None);
        assert_eq!(
            dispatcher.on_directional_input(Direction::Up, presence.store()),
            Some(ClientMessage::Move { x: 10.0, y: -10.0 })
        );
    }

    /// Proximity is current right after every mutation
    #[test]
    fn proximity_tracks_every_generation() {
        let mut presence = PresenceState::new(ProximityEngine::new(100.0), true);
        presence.apply_join(
            PlayerId::from("A"),
            vec![PlayerRecord::new("A", 0.0, 0.0), PlayerRecord::new("B", 500.0, 0.0)],
        );
        assert!(presence.proximity().is_empty());

        for step in 1..=5 {
            let bx = 500.0 - step as f64 * 100.0;
            presence.apply_snapshot(
                vec![PlayerRecord::new("A", 0.0, 0.0), PlayerRecord::new("B", bx, 0.0)],
                None,
            );

            let expected = compute_proximity(presence.store(), 100.0);
            assert_eq!(presence.proximity(), &expected);
            assert_eq!(
                presence.proximity().contains(&PlayerId::from("B")),
                bx < 100.0,
                "B at {} after step {}",
                bx,
                step
            );
        }
        assert_eq!(presence.generation(), 6);
    }
}

/// LIVE WEBSOCKET TESTS
mod websocket_tests {
    use super::*;

    /// Starts a one-connection server that sends `script` then forwards every
    /// text frame it receives.
    async fn scripted_server(script: Vec<String>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (received_tx, received_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

            for text in script {
                socket.send(Message::Text(text)).await.unwrap();
            }

            while let Some(Ok(message)) = socket.next().await {
                if let Message::Text(text) = message {
                    let _ = received_tx.send(text);
                }
            }
        });

        (format!("ws://{}/ws?room=default", addr), received_rx)
    }

    async fn next_event(handle: &mut ConnectionHandle) -> ChannelEvent {
        timeout(Duration::from_secs(5), handle.recv())
            .await
            .expect("timed out waiting for channel event")
            .expect("connection task ended")
    }

    /// Full round trip: join, snapshot, move request
    #[tokio::test]
    async fn join_snapshot_and_move_round_trip() {
        let script = vec![
            json!({
                "type": "JOIN",
                "payload": {"your_id": "A", "players": [{"id": "A", "x": 10, "y": 10}]}
            })
            .to_string(),
            "not json at all".to_string(),
            json!({
                "type": "WORLD_STATE",
                "payload": {"players": [
                    {"id": "A", "x": 10, "y": 10},
                    {"id": "B", "x": 60, "y": 10},
                    {"id": "C", "x": 400, "y": 10}
                ]}
            })
            .to_string(),
        ];
        let (url, mut received) = scripted_server(script).await;

        let mut handle = ConnectionHandle::spawn(&Handle::current(), url, 0);
        let mut presence = PresenceState::default();

        assert_eq!(next_event(&mut handle).await, ChannelEvent::Connected);

        let mut outcomes = Vec::new();
        for _ in 0..3 {
            match next_event(&mut handle).await {
                ChannelEvent::Message(text) => outcomes.push(presence.handle_text(&text)),
                other => panic!("Expected a message, got {:?}", other),
            }
        }
        assert_eq!(outcomes, vec![Applied::Joined, Applied::Ignored, Applied::Snapshot]);
        assert_eq!(presence.proximity().len(), 1);
        assert!(presence.proximity().contains(&PlayerId::from("B")));

        let request = IntentDispatcher::default()
            .on_directional_input(Direction::Up, presence.store())
            .unwrap();
        assert_ok!(handle.send(request));

        let text = timeout(Duration::from_secs(5), received.recv())
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "MOVE");
        assert_approx_eq!(value["payload"]["x"].as_f64().unwrap(), 10.0, 1e-9);
        assert_approx_eq!(value["payload"]["y"].as_f64().unwrap(), 0.0, 1e-9);

        handle.shutdown().await;
    }

    /// The frame-loop driver applies queued channel events in order
    #[tokio::test]
    async fn app_pumps_live_channel() {
        let script = vec![json!({
            "type": "JOIN",
            "payload": {"your_id": "A", "players": [
                {"id": "A", "x": 0, "y": 0},
                {"id": "B", "x": 99, "y": 0}
            ]}
        })
        .to_string()];
        let (url, mut received) = scripted_server(script).await;

        let handle = ConnectionHandle::spawn(&Handle::current(), url, 0);
        let mut app = App::new(&ClientConfig::default(), handle);

        let joined = timeout(Duration::from_secs(5), async {
            loop {
                app.pump_network();
                if app.presence().store().local_player().is_some() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(joined.is_ok(), "never received JOIN");
        assert!(app.is_connected());
        assert!(app.presence().proximity().contains(&PlayerId::from("B")));

        assert!(app.handle_direction(Direction::Left));
        let text = timeout(Duration::from_secs(5), received.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            ClientMessage::decode(&text).unwrap(),
            ClientMessage::Move { x: -10.0, y: 0.0 }
        );
    }

    /// A server that goes away surfaces as a disconnect, not a crash
    #[tokio::test]
    async fn server_close_reports_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            let _ = socket.close(None).await;
        });

        let mut handle =
            ConnectionHandle::spawn(&Handle::current(), format!("ws://{}/ws", addr), 0);

        assert_eq!(next_event(&mut handle).await, ChannelEvent::Connected);
        match next_event(&mut handle).await {
            ChannelEvent::Disconnected { reason } => assert!(!reason.is_empty()),
            other => panic!("Expected a disconnect, got {:?}", other),
        }

        handle.shutdown().await;
    }
}
