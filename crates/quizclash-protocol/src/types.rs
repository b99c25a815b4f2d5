//! Core wire types shared by every QuizClash layer.
//!
//! Everything here is part of the JSON protocol spoken between the server
//! and its clients. Field names are camelCase and enum tags are lowercase
//! or kebab-case, since that is the shape the browser client expects, so the
//! serde attributes on these types are load-bearing, not cosmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Connection-scoped: allocated from a process-wide counter when the
/// WebSocket is accepted, and never reused while the process lives. The
/// newtype keeps it from being confused with other `u64`s in signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Characters a room code may contain.
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every room code.
pub const ROOM_CODE_LEN: usize = 6;

/// The external handle for one game room: six uppercase alphanumerics.
///
/// Codes are generated randomly; uniqueness is the registry's job (it
/// retries on collision), not this type's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generates a random code from the uppercase-alphanumeric charset.
    pub fn generate<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| {
                let i = rng.random_range(0..ROOM_CODE_CHARSET.len());
                ROOM_CODE_CHARSET[i] as char
            })
            .collect();
        Self(code)
    }

    /// Parses a client-supplied code, normalizing to uppercase.
    ///
    /// # Errors
    /// Returns [`InvalidRoomCode`] when the input is not exactly six
    /// alphanumeric characters.
    pub fn parse(input: &str) -> Result<Self, InvalidRoomCode> {
        let trimmed = input.trim();
        if trimmed.len() != ROOM_CODE_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(InvalidRoomCode(input.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A string that is not a well-formed room code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid room code: {0:?}")]
pub struct InvalidRoomCode(pub String);

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// The two sides of every contest. Serialized as `"red"` / `"blue"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    /// The other team.
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "red"),
            Team::Blue => write!(f, "blue"),
        }
    }
}

/// A pair of values, one per team, indexable by [`Team`].
///
/// This replaces ad-hoc `redX`/`blueX` field pairs (and the original
/// implementation's string-keyed per-team flags) with one struct that the
/// compiler can check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTeam<T> {
    pub red: T,
    pub blue: T,
}

impl<T> PerTeam<T> {
    pub fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }

    /// Both slots initialized to clones of the same value.
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            red: value.clone(),
            blue: value,
        }
    }

    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

impl<T> std::ops::Index<Team> for PerTeam<T> {
    type Output = T;

    fn index(&self, team: Team) -> &T {
        self.get(team)
    }
}

impl<T> std::ops::IndexMut<Team> for PerTeam<T> {
    fn index_mut(&mut self, team: Team) -> &mut T {
        self.get_mut(team)
    }
}

// ---------------------------------------------------------------------------
// Modes, status, power-ups
// ---------------------------------------------------------------------------

/// The three contest modes. Fixed at room creation, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    TugOfWar,
    RocketRush,
    CatapultClash,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::TugOfWar => write!(f, "tug-of-war"),
            GameMode::RocketRush => write!(f, "rocket-rush"),
            GameMode::CatapultClash => write!(f, "catapult-clash"),
        }
    }
}

/// Room lifecycle. Monotonic except for the explicit rematch path, which
/// re-enters `Playing` without ever passing through `Waiting` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Waiting => write!(f, "waiting"),
            SessionStatus::Playing => write!(f, "playing"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Single-use consumables granted to every player at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Double,
    Freeze,
    Shield,
}

impl fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerUpKind::Double => write!(f, "double"),
            PowerUpKind::Freeze => write!(f, "freeze"),
            PowerUpKind::Shield => write!(f, "shield"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A player as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub score: u32,
    pub streak: u32,
    pub power_ups: Vec<PowerUpKind>,
}

/// A question as broadcast to clients. Never carries the correct index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub category: String,
    pub difficulty: String,
    pub time_left: u32,
}

/// The mode-specific meter, flattened into [`StateSnapshot`] so each mode
/// exposes only its own fields on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeterSnapshot {
    #[serde(rename_all = "camelCase")]
    TugOfWar {
        rope_position: i32,
        pull_strength: i32,
        threshold: i32,
        red_pulls: u32,
        blue_pulls: u32,
    },
    #[serde(rename_all = "camelCase")]
    RocketRush {
        red_altitude: u32,
        blue_altitude: u32,
        boost_amount: u32,
        finish_line: u32,
    },
    #[serde(rename_all = "camelCase")]
    CatapultClash {
        red_health: u32,
        blue_health: u32,
        damage: u32,
        red_shots: u32,
        blue_shots: u32,
    },
}

/// The full authoritative room state, broadcast after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub mode: GameMode,
    pub status: SessionStatus,
    #[serde(flatten)]
    pub meter: MeterSnapshot,
    pub scores: PerTeam<u32>,
    pub team_red: Vec<PlayerView>,
    pub team_blue: Vec<PlayerView>,
    pub question_index: usize,
    pub total_questions: usize,
    pub current_round: u32,
    pub time_left: u32,
    pub game_duration: u32,
    pub answered_teams: Vec<Team>,
}

/// What a correct (or wrong) answer did to the contest meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Tug-of-war: the rope moved.
    Pull { team: Team, position: i32 },
    /// Rocket-rush: a rocket climbed.
    Boost { team: Team, altitude: u32 },
    /// Catapult-clash: the enemy castle took damage.
    Hit { team: Team, damage: u32 },
    /// The enemy's shield absorbed the effect. `team` is the attacker.
    Shielded { team: Team },
    /// The answer was wrong; the meter did not move.
    Wrong,
}

/// The visible result of activating a power-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PowerUpEffect {
    /// A shield now guards `team` against the next enemy answer.
    Shield { team: Team },
    /// `target` cannot answer for `duration_secs` seconds.
    Freeze { target: Team, duration_secs: u64 },
    /// `team`'s next correct answer hits twice as hard.
    Double { team: Team },
}

/// One row of the read-only room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: RoomCode,
    pub mode: GameMode,
    pub players: usize,
    pub status: SessionStatus,
}

// ---------------------------------------------------------------------------
// Routing target for an outbound event.
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Room logic returns `(Recipient, ServerEvent)` pairs; the room actor
/// does the actual delivery. Rejections go to one player, everything else
/// to the whole room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One specific player.
    Player(PlayerId),
}

// =========================================================================
// Tests
// =========================================================================
