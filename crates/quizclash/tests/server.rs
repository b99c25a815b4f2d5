//! End-to-end tests: real server, real WebSocket clients, JSON on the
//! wire exactly as a browser would send it.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use quizclash::prelude::*;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> std::net::SocketAddr {
    let server = QuizClashServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: std::net::SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}"))
        .await
        .expect("connect");
    client
}

async fn send(client: &mut Client, event: Value) {
    client
        .send(Message::Text(event.to_string().into()))
        .await
        .expect("send");
}

async fn recv(client: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("no frame within 5s")
            .expect("stream ended")
            .expect("frame error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("invalid JSON")
            }
            Message::Binary(bytes) => {
                return serde_json::from_slice(&bytes).expect("invalid JSON")
            }
            _ => continue,
        }
    }
}

/// Reads events until one has the wanted `type`, skipping up to `limit`
/// others (timer ticks, state updates).
async fn recv_type(client: &mut Client, wanted: &str, limit: usize) -> Value {
    for _ in 0..limit {
        let event = recv(client).await;
        if event["type"] == wanted {
            return event;
        }
    }
    panic!("no {wanted} event within {limit} messages");
}

#[tokio::test]
async fn test_create_room_acks_with_code() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({"type": "create-room", "playerName": "Ada", "mode": "tug-of-war"}),
    )
    .await;

    let ack = recv(&mut client).await;
    assert_eq!(ack["type"], "room-created");
    assert_eq!(ack["roomCode"].as_str().unwrap().len(), 6);
    assert_eq!(ack["team"], "red");
    assert_eq!(ack["player"]["name"], "Ada");
    assert_eq!(ack["player"]["powerUps"], json!(["double", "freeze", "shield"]));
}

#[tokio::test]
async fn test_join_unknown_room_is_rejected() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({"type": "join-room", "roomCode": "ZZZZZ9", "playerName": "Bo"}),
    )
    .await;

    let rejection = recv(&mut client).await;
    assert_eq!(rejection["type"], "join-rejected");
    assert_eq!(rejection["error"], "Room not found!");
}

#[tokio::test]
async fn test_malformed_event_reports_error_and_keeps_connection() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(&mut client, json!({"type": "fly-to-moon"})).await;
    let error = recv(&mut client).await;
    assert_eq!(error["type"], "error");

    // The connection still works afterwards.
    send(
        &mut client,
        json!({"type": "create-room", "playerName": "Ada", "mode": "rocket-rush"}),
    )
    .await;
    let ack = recv(&mut client).await;
    assert_eq!(ack["type"], "room-created");
}

#[tokio::test]
async fn test_two_clients_play_a_round() {
    let addr = start_server().await;
    let mut creator = connect(addr).await;
    let mut joiner = connect(addr).await;

    send(
        &mut creator,
        json!({"type": "create-room", "playerName": "Ada", "mode": "catapult-clash"}),
    )
    .await;
    let created = recv(&mut creator).await;
    let code = created["roomCode"].as_str().unwrap().to_string();

    send(
        &mut joiner,
        json!({"type": "join-room", "roomCode": code, "playerName": "Bo"}),
    )
    .await;
    let joined = recv(&mut joiner).await;
    assert_eq!(joined["type"], "room-joined");
    // Auto-balance puts the second player on blue.
    assert_eq!(joined["team"], "blue");

    let announced = recv(&mut creator).await;
    assert_eq!(announced["type"], "player-joined");
    assert_eq!(announced["player"]["name"], "Bo");

    send(&mut creator, json!({"type": "start-game", "roomCode": code})).await;
    for client in [&mut creator, &mut joiner] {
        let started = recv_type(client, "game-started", 4).await;
        assert_eq!(started["mode"], "catapult-clash");
        assert_eq!(started["state"]["redHealth"], 100);
        assert_eq!(started["state"]["status"], "playing");
        assert!(started["question"]["correctIndex"].is_null());
    }

    // An out-of-range answer index is graded as wrong, which lets the
    // test avoid knowing the deck's answer key.
    send(
        &mut creator,
        json!({"type": "submit-answer", "roomCode": code, "answerIndex": 99}),
    )
    .await;
    let result = recv_type(&mut joiner, "answer-result", 6).await;
    assert_eq!(result["correct"], false);
    assert_eq!(result["team"], "red");
    assert_eq!(result["pointsEarned"], 0);

    let update = recv_type(&mut joiner, "state-update", 6).await;
    assert_eq!(update["lastAction"]["type"], "wrong");
    assert_eq!(update["state"]["answeredTeams"], json!(["red"]));
}

#[tokio::test]
async fn test_clock_ticks_reach_clients() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({"type": "create-room", "playerName": "Solo", "mode": "tug-of-war"}),
    )
    .await;
    let created = recv(&mut client).await;
    let code = created["roomCode"].as_str().unwrap();

    send(&mut client, json!({"type": "start-game", "roomCode": code})).await;
    let _ = recv_type(&mut client, "game-started", 4).await;

    let tick = recv_type(&mut client, "timer-tick", 4).await;
    assert_eq!(tick["timeLeft"], 99);
}

#[tokio::test]
async fn test_switch_team_broadcast() {
    let addr = start_server().await;
    let mut creator = connect(addr).await;
    let mut joiner = connect(addr).await;

    send(
        &mut creator,
        json!({"type": "create-room", "playerName": "Ada", "mode": "tug-of-war"}),
    )
    .await;
    let created = recv(&mut creator).await;
    let code = created["roomCode"].as_str().unwrap().to_string();

    send(
        &mut joiner,
        json!({"type": "join-room", "roomCode": code, "playerName": "Bo"}),
    )
    .await;
    let _ = recv(&mut joiner).await; // room-joined

    send(&mut joiner, json!({"type": "switch-team", "roomCode": code})).await;
    let updated = recv_type(&mut creator, "teams-updated", 4).await;
    assert_eq!(updated["switchedPlayer"]["team"], "red");
    assert_eq!(updated["teamRed"].as_array().unwrap().len(), 2);
    assert_eq!(updated["teamBlue"].as_array().unwrap().len(), 0);
}
