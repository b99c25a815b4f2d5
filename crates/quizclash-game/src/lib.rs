//! Game core for QuizClash.
//!
//! Pure, synchronous rules: team rosters, the three contest meters,
//! power-ups, round orchestration, and the [`GameSession`] state machine
//! that ties them together. No I/O and no timers live here; the room
//! layer drives a session from its event loop and owns the clocks.

mod config;
mod error;
mod mode;
mod powerup;
mod quiz;
mod roster;
mod round;
mod session;

pub use config::GameConfig;
pub use error::{PowerUpError, RejectReason, SessionError};
pub use mode::{ModeState, TeamEffects};
pub use quiz::{Question, QuestionDeck, QuestionSource};
pub use roster::{Player, Roster};
pub use round::{AdvancePlan, AnswerOutcome, RoundCoordinator};
pub use session::{
    CountdownStep, GameSession, PowerUpOutcome, SubmitOutcome,
};
