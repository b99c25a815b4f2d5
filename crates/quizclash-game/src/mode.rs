//! Mode-specific contest state: the meter each mode fights over, plus
//! the transient team effects (freeze, shield, double) that power-ups
//! layer on top of it.

use std::time::Instant;

use quizclash_protocol::{Action, GameMode, MeterSnapshot, PerTeam, Team};

use crate::GameConfig;

/// Transient combat modifiers for one team. All of them are cleared when
/// a new game starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamEffects {
    /// The team cannot answer until this instant passes.
    pub frozen_until: Option<Instant>,
    /// The next enemy meter effect is absorbed instead of applied.
    pub shield_active: bool,
    /// The team's next correct answer counts double on the meter.
    pub double_next: bool,
}

/// The contested meter. Each variant holds the live numbers for one mode;
/// the config constants it was built from travel along so snapshots stay
/// self-describing.
#[derive(Debug, Clone)]
enum Meter {
    /// Rope position: negative is red territory, positive is blue.
    TugOfWar {
        rope_position: i32,
        pull_strength: i32,
        threshold: i32,
        pulls: PerTeam<u32>,
    },
    /// Two rockets race to the finish line.
    RocketRush {
        altitude: PerTeam<u32>,
        boost_amount: u32,
        finish_line: u32,
    },
    /// Each correct answer chips the enemy castle down.
    CatapultClash {
        health: PerTeam<u32>,
        damage: u32,
        shots: PerTeam<u32>,
    },
}

/// The mode meter plus both teams' active effects. One per session,
/// rebuilt from the config whenever a game starts.
#[derive(Debug, Clone)]
pub struct ModeState {
    mode: GameMode,
    meter: Meter,
    effects: PerTeam<TeamEffects>,
}

impl ModeState {
    pub fn new(mode: GameMode, cfg: &GameConfig) -> Self {
        let meter = match mode {
            GameMode::TugOfWar => Meter::TugOfWar {
                rope_position: 0,
                pull_strength: cfg.pull_strength,
                threshold: cfg.rope_threshold,
                pulls: PerTeam::default(),
            },
            GameMode::RocketRush => Meter::RocketRush {
                altitude: PerTeam::default(),
                boost_amount: cfg.boost_amount,
                finish_line: cfg.finish_line,
            },
            GameMode::CatapultClash => Meter::CatapultClash {
                health: PerTeam::splat(cfg.castle_health),
                damage: cfg.catapult_damage,
                shots: PerTeam::default(),
            },
        };
        Self {
            mode,
            meter,
            effects: PerTeam::default(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Applies one correct answer from `team` to the meter.
    ///
    /// The enemy shield is checked first: if active it is consumed and the
    /// meter does not move at all. A pending double is consumed whether or
    /// not it ends up shielded.
    pub fn apply_correct_answer(&mut self, team: Team) -> Action {
        let doubled = std::mem::take(&mut self.effects[team].double_next);
        let mult = if doubled { 2 } else { 1 };

        let enemy = team.opponent();
        if std::mem::take(&mut self.effects[enemy].shield_active) {
            return Action::Shielded { team };
        }

        match &mut self.meter {
            Meter::TugOfWar {
                rope_position,
                pull_strength,
                threshold,
                pulls,
            } => {
                // Red pulls the rope negative, blue positive.
                let delta = match team {
                    Team::Red => -*pull_strength * mult,
                    Team::Blue => *pull_strength * mult,
                };
                *rope_position =
                    (*rope_position + delta).clamp(-*threshold, *threshold);
                pulls[team] += 1;
                Action::Pull {
                    team,
                    position: *rope_position,
                }
            }
            Meter::RocketRush {
                altitude,
                boost_amount,
                finish_line,
            } => {
                altitude[team] =
                    (altitude[team] + *boost_amount * mult as u32).min(*finish_line);
                Action::Boost {
                    team,
                    altitude: altitude[team],
                }
            }
            Meter::CatapultClash {
                health,
                damage,
                shots,
            } => {
                let dealt = *damage * mult as u32;
                health[enemy] = health[enemy].saturating_sub(dealt);
                shots[team] += 1;
                Action::Hit {
                    team,
                    damage: dealt,
                }
            }
        }
    }

    /// Whether the meter has reached a terminal position.
    pub fn check_win(&self) -> bool {
        match &self.meter {
            Meter::TugOfWar {
                rope_position,
                threshold,
                ..
            } => rope_position.abs() >= *threshold,
            Meter::RocketRush {
                altitude,
                finish_line,
                ..
            } => altitude.red >= *finish_line || altitude.blue >= *finish_line,
            Meter::CatapultClash { health, .. } => {
                health.red == 0 || health.blue == 0
            }
        }
    }

    /// Decides the winner from the meter, falling back to softer signals
    /// when nothing is terminal. Ties always go to red.
    ///
    /// Precedence: terminal meter position, then meter magnitude or
    /// direction, then pull count (tug-of-war only), then team score.
    pub fn winner(&self, scores: &PerTeam<u32>) -> Team {
        match &self.meter {
            Meter::TugOfWar {
                rope_position,
                pulls,
                ..
            } => {
                if *rope_position < 0 {
                    Team::Red
                } else if *rope_position > 0 {
                    Team::Blue
                } else if pulls.red != pulls.blue {
                    if pulls.red > pulls.blue { Team::Red } else { Team::Blue }
                } else if scores.blue > scores.red {
                    Team::Blue
                } else {
                    Team::Red
                }
            }
            Meter::RocketRush { altitude, .. } => {
                if altitude.red != altitude.blue {
                    if altitude.red > altitude.blue { Team::Red } else { Team::Blue }
                } else if scores.blue > scores.red {
                    Team::Blue
                } else {
                    Team::Red
                }
            }
            Meter::CatapultClash { health, .. } => {
                // Higher remaining health wins.
                if health.red != health.blue {
                    if health.red > health.blue { Team::Red } else { Team::Blue }
                } else if scores.blue > scores.red {
                    Team::Blue
                } else {
                    Team::Red
                }
            }
        }
    }

    pub fn freeze(&mut self, team: Team, until: Instant) {
        self.effects[team].frozen_until = Some(until);
    }

    /// Whether `team` is frozen at `now`. Expired freezes are cleared on
    /// the way out.
    pub fn is_frozen(&mut self, team: Team, now: Instant) -> bool {
        match self.effects[team].frozen_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.effects[team].frozen_until = None;
                false
            }
            None => false,
        }
    }

    pub fn arm_shield(&mut self, team: Team) {
        self.effects[team].shield_active = true;
    }

    pub fn arm_double(&mut self, team: Team) {
        self.effects[team].double_next = true;
    }

    pub fn shield_active(&self, team: Team) -> bool {
        self.effects[team].shield_active
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        match &self.meter {
            Meter::TugOfWar {
                rope_position,
                pull_strength,
                threshold,
                pulls,
            } => MeterSnapshot::TugOfWar {
                rope_position: *rope_position,
                pull_strength: *pull_strength,
                threshold: *threshold,
                red_pulls: pulls.red,
                blue_pulls: pulls.blue,
            },
            Meter::RocketRush {
                altitude,
                boost_amount,
                finish_line,
            } => MeterSnapshot::RocketRush {
                red_altitude: altitude.red,
                blue_altitude: altitude.blue,
                boost_amount: *boost_amount,
                finish_line: *finish_line,
            },
            Meter::CatapultClash {
                health,
                damage,
                shots,
            } => MeterSnapshot::CatapultClash {
                red_health: health.red,
                blue_health: health.blue,
                damage: *damage,
                red_shots: shots.red,
                blue_shots: shots.blue,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn state(mode: GameMode) -> ModeState {
        ModeState::new(mode, &GameConfig::default())
    }

    #[test]
    fn test_tug_red_pulls_negative_blue_positive() {
        let mut s = state(GameMode::TugOfWar);
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Pull { team: Team::Red, position: -8 }
        );
        assert_eq!(
            s.apply_correct_answer(Team::Blue),
            Action::Pull { team: Team::Blue, position: 0 }
        );
    }

    #[test]
    fn test_tug_rope_clamps_at_threshold() {
        let mut s = state(GameMode::TugOfWar);
        // 13 pulls at strength 8 would overshoot -104; the rope stops at -100.
        let mut last = 0;
        for _ in 0..13 {
            if let Action::Pull { position, .. } = s.apply_correct_answer(Team::Red) {
                last = position;
            }
        }
        assert_eq!(last, -100);
        assert!(s.check_win());
        assert_eq!(s.winner(&PerTeam::default()), Team::Red);
    }

    #[test]
    fn test_rocket_altitude_caps_at_finish_line() {
        let mut s = state(GameMode::RocketRush);
        for _ in 0..13 {
            s.apply_correct_answer(Team::Blue);
        }
        match s.snapshot() {
            MeterSnapshot::RocketRush { blue_altitude, .. } => {
                assert_eq!(blue_altitude, 100)
            }
            other => panic!("wrong meter: {other:?}"),
        }
        assert!(s.check_win());
        assert_eq!(s.winner(&PerTeam::default()), Team::Blue);
    }

    #[test]
    fn test_catapult_health_saturates_at_zero() {
        let mut s = state(GameMode::CatapultClash);
        // 100 / 12 = 8.33, so nine hits finish the castle.
        for _ in 0..9 {
            s.apply_correct_answer(Team::Red);
        }
        match s.snapshot() {
            MeterSnapshot::CatapultClash { blue_health, red_shots, .. } => {
                assert_eq!(blue_health, 0);
                assert_eq!(red_shots, 9);
            }
            other => panic!("wrong meter: {other:?}"),
        }
        assert!(s.check_win());
    }

    #[test]
    fn test_shield_absorbs_before_meter_moves() {
        let mut s = state(GameMode::TugOfWar);
        s.arm_shield(Team::Blue);
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Shielded { team: Team::Red }
        );
        // Shield consumed; next pull lands normally.
        assert!(!s.shield_active(Team::Blue));
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Pull { team: Team::Red, position: -8 }
        );
    }

    #[test]
    fn test_double_applies_once() {
        let mut s = state(GameMode::CatapultClash);
        s.arm_double(Team::Red);
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Hit { team: Team::Red, damage: 24 }
        );
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Hit { team: Team::Red, damage: 12 }
        );
    }

    #[test]
    fn test_double_is_consumed_even_when_shielded() {
        let mut s = state(GameMode::CatapultClash);
        s.arm_double(Team::Red);
        s.arm_shield(Team::Blue);
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Shielded { team: Team::Red }
        );
        assert_eq!(
            s.apply_correct_answer(Team::Red),
            Action::Hit { team: Team::Red, damage: 12 }
        );
    }

    #[test]
    fn test_freeze_expires() {
        let mut s = state(GameMode::TugOfWar);
        let now = Instant::now();
        s.freeze(Team::Blue, now + Duration::from_secs(5));
        assert!(s.is_frozen(Team::Blue, now + Duration::from_secs(2)));
        assert!(!s.is_frozen(Team::Blue, now + Duration::from_secs(6)));
        // Cleared after expiry, not just masked.
        assert!(!s.is_frozen(Team::Blue, now + Duration::from_secs(3)));
    }

    #[test]
    fn test_winner_tug_falls_back_to_pull_count_then_score() {
        let mut s = state(GameMode::TugOfWar);
        // Equal pulls from each side: rope back at zero.
        s.apply_correct_answer(Team::Red);
        s.apply_correct_answer(Team::Blue);
        // Unequal scores break the tie.
        assert_eq!(s.winner(&PerTeam::new(10, 30)), Team::Blue);
        // Full tie goes to red.
        assert_eq!(s.winner(&PerTeam::new(10, 10)), Team::Red);
    }

    #[test]
    fn test_winner_rocket_prefers_altitude_over_score() {
        let mut s = state(GameMode::RocketRush);
        s.apply_correct_answer(Team::Red);
        assert_eq!(s.winner(&PerTeam::new(0, 500)), Team::Red);
    }
}
