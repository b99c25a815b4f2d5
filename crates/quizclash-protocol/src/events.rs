//! The event vocabulary: what clients send, what the server answers.
//!
//! Both enums are internally tagged with `type`, kebab-cased, so the wire
//! looks like `{ "type": "submit-answer", "roomCode": "AB12CD", ... }`.
//! Every room-scoped client event carries the room code explicitly; the
//! server validates it against the registry rather than trusting any
//! per-connection ambient state.

use serde::{Deserialize, Serialize};

use crate::{
    Action, GameMode, PlayerId, PlayerView, PowerUpEffect, PowerUpKind,
    QuestionView, RoomCode, StateSnapshot, Team,
};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Everything a client may ask the server to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Open a fresh room; the creator lands on the red team.
    CreateRoom {
        player_name: String,
        mode: GameMode,
    },

    /// Join an existing room; the server balances team assignment.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Flip the sender between red and blue.
    SwitchTeam { room_code: RoomCode },

    /// Begin the game (only valid while the room is waiting).
    StartGame { room_code: RoomCode },

    /// Answer the current question. `team` is only honored in
    /// single-device rooms where one connection drives both teams.
    SubmitAnswer {
        room_code: RoomCode,
        answer_index: usize,
        #[serde(default)]
        team: Option<Team>,
    },

    /// Spend one power-up from the sender's inventory.
    UsePowerup {
        room_code: RoomCode,
        power_up_type: PowerUpKind,
    },

    /// Manual question skip (does not advance the round counter).
    NextQuestion { room_code: RoomCode },

    /// Restart the finished game with the same roster and room code.
    Rematch { room_code: RoomCode },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The player whose team changed, attached to `teams-updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchedPlayer {
    pub id: PlayerId,
    pub team: Team,
}

/// Everything the server sends back. Acks and rejections go to a single
/// connection; the rest are room-wide broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Ack for `create-room`.
    RoomCreated {
        room_code: RoomCode,
        player: PlayerView,
        team: Team,
    },

    /// Ack for `join-room`.
    RoomJoined {
        room_code: RoomCode,
        player: PlayerView,
        team: Team,
    },

    /// Targeted: the join (or create) could not be honored.
    JoinRejected { error: String },

    /// Broadcast: a new player arrived.
    PlayerJoined {
        player: PlayerView,
        team_red: Vec<PlayerView>,
        team_blue: Vec<PlayerView>,
    },

    /// Broadcast: someone switched sides.
    TeamsUpdated {
        team_red: Vec<PlayerView>,
        team_blue: Vec<PlayerView>,
        switched_player: SwitchedPlayer,
    },

    /// Broadcast: the contest began.
    GameStarted {
        mode: GameMode,
        state: StateSnapshot,
        question: QuestionView,
    },

    /// Broadcast once per second while the game is playing.
    TimerTick { time_left: u32 },

    /// Targeted: the sender's answer was not accepted.
    AnswerRejected { reason: String },

    /// Broadcast: how the last answer was graded.
    AnswerResult {
        correct: bool,
        correct_answer: String,
        points_earned: u32,
        team: Team,
        player_name: String,
    },

    /// Broadcast: fresh authoritative state after an answer.
    StateUpdate {
        state: StateSnapshot,
        last_action: Action,
        team: Team,
        player_name: String,
    },

    /// Broadcast: the round moved on to a new question.
    NewQuestion {
        question: QuestionView,
        state: StateSnapshot,
    },

    /// Broadcast: nobody answered correctly; the round is moving on.
    BothWrong { message: String },

    /// Broadcast: a power-up took effect.
    PowerupActivated {
        power_up_type: PowerUpKind,
        team: Team,
        state: StateSnapshot,
        effect: PowerUpEffect,
    },

    /// Targeted: the power-up could not be used.
    PowerupFailed { reason: String },

    /// Broadcast: the game is over.
    GameOver { winner: Team, state: StateSnapshot },

    /// Broadcast: a rematch began.
    RematchStarted {
        state: StateSnapshot,
        question: QuestionView,
    },

    /// Broadcast: a player disconnected.
    PlayerLeft {
        player_id: PlayerId,
        team_red: Vec<PlayerView>,
        team_blue: Vec<PlayerView>,
    },

    /// Targeted: a request failed outside the game rules (bad room code,
    /// malformed event, ...).
    Error { message: String },
}
