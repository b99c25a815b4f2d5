//! Errors surfaced to callers of the room layer.

use quizclash_protocol::RoomCode;

/// Why a room operation failed before reaching the game rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room exists but is mid-game and not accepting joins.
    #[error("room {0} has a game in progress")]
    GameInProgress(RoomCode),

    /// The room actor is gone or not responding (shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
