//! Error taxonomy for the game core.
//!
//! Rejections are expected, non-fatal outcomes of client input: they are
//! reported to the offending connection only, and by the time one is
//! returned no state has been mutated.

use quizclash_protocol::SessionStatus;

/// Why an answer submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The submitting connection is not a member of this room.
    #[error("player not found in this room")]
    PlayerNotFound,

    /// In a multi-connection room, a player claimed the other team.
    #[error("cannot answer for the other team")]
    WrongTeam,

    /// The team is frozen by an enemy power-up.
    #[error("your team is frozen, wait it out")]
    Frozen,

    /// The team already used its one answer this round.
    #[error("team already answered this round")]
    AlreadyAnswered,

    /// No question is active (exhausted or uninitialized source).
    #[error("no question is active")]
    NoQuestion,

    /// The game is not in the playing state.
    #[error("game is not running")]
    GameNotRunning,
}

/// Why a power-up activation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PowerUpError {
    #[error("player not found in this room")]
    PlayerNotFound,

    /// The player's inventory does not hold this power-up.
    #[error("power-up not available")]
    NotAvailable,

    #[error("game is not running")]
    GameNotRunning,
}

/// Lifecycle violations on the session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A join arrived while the game was already playing.
    #[error("game already in progress")]
    GameInProgress,

    /// `start` called outside the waiting state.
    #[error("cannot start from the {0} state")]
    AlreadyStarted(SessionStatus),
}
