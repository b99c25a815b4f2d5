//! Power-up activation. Inventory checks live in the roster; this module
//! only translates a consumed power-up into its effect on [`ModeState`].

use std::time::Instant;

use quizclash_protocol::{PowerUpEffect, PowerUpKind, Team};

use crate::{GameConfig, ModeState};

/// Applies `kind` on behalf of `team` and reports the visible effect.
///
/// Shields and doubles arm the owning team; a freeze locks the opponent
/// out until `now + freeze_duration`.
pub fn activate(
    kind: PowerUpKind,
    team: Team,
    state: &mut ModeState,
    now: Instant,
    cfg: &GameConfig,
) -> PowerUpEffect {
    match kind {
        PowerUpKind::Shield => {
            state.arm_shield(team);
            PowerUpEffect::Shield { team }
        }
        PowerUpKind::Freeze => {
            let target = team.opponent();
            state.freeze(target, now + cfg.freeze_duration);
            PowerUpEffect::Freeze {
                target,
                duration_secs: cfg.freeze_duration.as_secs(),
            }
        }
        PowerUpKind::Double => {
            state.arm_double(team);
            PowerUpEffect::Double { team }
        }
    }
}
