//! Per-connection handler: WebSocket accept, event routing, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The task pumps two directions through one `select!` loop:
//! client events are decoded and routed to the right room actor, and
//! server events queued by that actor are encoded back out. On exit the
//! player is removed from their room and the room is reaped if that
//! left it empty.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use quizclash_protocol::{
    ClientEvent, Codec, PlayerId, RoomCode, ServerEvent, Team,
};
use quizclash_room::{EventSender, RoomError};

use crate::server::ServerState;
use crate::QuizClashError;

/// Process-wide player id counter. Connection-scoped ids, never reused.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    state: Arc<ServerState>,
) -> Result<(), QuizClashError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    debug!(%player_id, "connection established");

    // The room actor queues events here; this loop drains them onto the
    // socket.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let mut current_room: Option<RoomCode> = None;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                let text = match state.codec.encode(&event) {
                    Ok(bytes) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(e) => {
                            debug!(%player_id, error = %e, "non-utf8 encoder output");
                            continue;
                        }
                    },
                    Err(e) => {
                        debug!(%player_id, error = %e, "event encoding failed");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = source.next() => {
                let message = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                    None => break,
                };
                let data = match &message {
                    Message::Text(text) => text.as_bytes(),
                    Message::Binary(bytes) => bytes.as_ref(),
                    Message::Close(_) => break,
                    // Pings are answered by tungstenite itself.
                    _ => continue,
                };
                let event: ClientEvent = match state.codec.decode(data) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!(%player_id, error = %e, "undecodable client event");
                        let _ = event_tx.send(ServerEvent::Error {
                            message: format!("invalid event: {e}"),
                        });
                        continue;
                    }
                };
                dispatch_event(
                    &state,
                    player_id,
                    &event_tx,
                    &mut current_room,
                    event,
                )
                .await;
            }
        }
    }

    // Cleanup: drop room membership, reap the room if it emptied.
    if let Some(code) = current_room {
        let mut registry = state.registry.lock().await;
        match registry.remove_player_and_maybe_reap(&code, player_id).await {
            Ok(remaining) => {
                info!(%player_id, room = %code, remaining, "player disconnected")
            }
            Err(e) => debug!(%player_id, room = %code, error = %e, "cleanup failed"),
        }
    } else {
        debug!(%player_id, "connection closed");
    }

    Ok(())
}

/// Routes one decoded client event. Failures are reported back on the
/// player's own event channel; nothing here tears the connection down.
async fn dispatch_event(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    event_tx: &EventSender,
    current_room: &mut Option<RoomCode>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::CreateRoom { player_name, mode } => {
            if current_room.is_some() {
                let _ = event_tx.send(ServerEvent::JoinRejected {
                    error: "already in a room".into(),
                });
                return;
            }
            let handle = state.registry.lock().await.create(mode);
            // The creator opens on the red team.
            match handle
                .join(player_id, player_name, Some(Team::Red), event_tx.clone())
                .await
            {
                Ok(joined) => {
                    *current_room = Some(joined.room_code.clone());
                    let _ = event_tx.send(ServerEvent::RoomCreated {
                        room_code: joined.room_code,
                        player: joined.player,
                        team: joined.team,
                    });
                }
                Err(e) => {
                    // Freshly created and already unjoinable: actor died.
                    warn!(%player_id, error = %e, "join into new room failed");
                    let _ = event_tx.send(ServerEvent::JoinRejected {
                        error: e.to_string(),
                    });
                }
            }
        }

        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            if current_room.is_some() {
                let _ = event_tx.send(ServerEvent::JoinRejected {
                    error: "already in a room".into(),
                });
                return;
            }
            let handle = match state.registry.lock().await.lookup(&room_code) {
                Ok(handle) => handle,
                Err(_) => {
                    let _ = event_tx.send(ServerEvent::JoinRejected {
                        error: "Room not found!".into(),
                    });
                    return;
                }
            };
            match handle
                .join(player_id, player_name, None, event_tx.clone())
                .await
            {
                Ok(joined) => {
                    *current_room = Some(joined.room_code.clone());
                    let _ = event_tx.send(ServerEvent::RoomJoined {
                        room_code: joined.room_code,
                        player: joined.player,
                        team: joined.team,
                    });
                }
                Err(RoomError::GameInProgress(_)) => {
                    let _ = event_tx.send(ServerEvent::JoinRejected {
                        error: "Game already in progress!".into(),
                    });
                }
                Err(e) => {
                    let _ = event_tx.send(ServerEvent::JoinRejected {
                        error: e.to_string(),
                    });
                }
            }
        }

        ClientEvent::SwitchTeam { room_code } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.switch_team(player_id).await
            })
            .await;
        }

        ClientEvent::StartGame { room_code } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.start_game(player_id).await
            })
            .await;
        }

        ClientEvent::SubmitAnswer {
            room_code,
            answer_index,
            team,
        } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.submit_answer(player_id, answer_index, team).await
            })
            .await;
        }

        ClientEvent::UsePowerup {
            room_code,
            power_up_type,
        } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.use_power_up(player_id, power_up_type).await
            })
            .await;
        }

        ClientEvent::NextQuestion { room_code } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.next_question().await
            })
            .await;
        }

        ClientEvent::Rematch { room_code } => {
            route(state, event_tx, &room_code, |handle| async move {
                handle.rematch().await
            })
            .await;
        }
    }
}

/// Resolves a room code and runs `op` against its handle, reporting any
/// failure to the player.
async fn route<F, Fut>(
    state: &Arc<ServerState>,
    event_tx: &EventSender,
    room_code: &RoomCode,
    op: F,
) where
    F: FnOnce(quizclash_room::RoomHandle) -> Fut,
    Fut: Future<Output = Result<(), RoomError>>,
{
    let handle = match state.registry.lock().await.lookup(room_code) {
        Ok(handle) => handle,
        Err(e) => {
            let _ = event_tx.send(ServerEvent::Error {
                message: e.to_string(),
            });
            return;
        }
    };
    if let Err(e) = op(handle).await {
        let _ = event_tx.send(ServerEvent::Error {
            message: e.to_string(),
        });
    }
}
