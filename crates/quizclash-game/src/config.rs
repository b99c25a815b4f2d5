//! Tunables for a game session.

use std::time::Duration;

/// Configuration for one room's contest. Every room gets a clone at
/// creation; changing the registry default never affects running rooms.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Tug-of-war: rope movement per correct answer.
    pub pull_strength: i32,
    /// Tug-of-war: rope position (absolute) needed to win.
    pub rope_threshold: i32,
    /// Rocket-rush: altitude gained per correct answer.
    pub boost_amount: u32,
    /// Rocket-rush: altitude that wins.
    pub finish_line: u32,
    /// Catapult-clash: starting castle health.
    pub castle_health: u32,
    /// Catapult-clash: damage per correct answer.
    pub catapult_damage: u32,
    /// Points for a correct answer.
    pub base_points: u32,
    /// Extra points once the streak passes `streak_threshold`.
    pub streak_bonus: u32,
    /// Consecutive correct answers needed before the bonus kicks in.
    pub streak_threshold: u32,
    /// How long a freeze power-up locks the enemy team out.
    pub freeze_duration: Duration,
    /// Total game length in seconds.
    pub game_duration_secs: u32,
    /// Advance delay after a correct answer (clients render the effect).
    pub correct_advance_delay: Duration,
    /// Advance delay after both teams answered wrong.
    pub both_wrong_delay: Duration,
    /// Fallback advance when one team answered wrong and the other never
    /// engages. Prevents a room from stalling forever.
    pub stalled_advance_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pull_strength: 8,
            rope_threshold: 100,
            boost_amount: 8,
            finish_line: 100,
            castle_health: 100,
            catapult_damage: 12,
            base_points: 10,
            streak_bonus: 5,
            streak_threshold: 3,
            freeze_duration: Duration::from_secs(5),
            game_duration_secs: 100,
            correct_advance_delay: Duration::from_secs(1),
            both_wrong_delay: Duration::from_secs(5),
            stalled_advance_delay: Duration::from_secs(10),
        }
    }
}
