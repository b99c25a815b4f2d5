//! The authoritative state machine for one room's game.
//!
//! A [`GameSession`] owns everything a contest needs: the roster, the
//! mode meter, the round coordinator, the question source, and the clock.
//! It is purely synchronous; the room actor drives it and owns the timers.

use std::time::Instant;

use tracing::debug;

use quizclash_protocol::{
    GameMode, PerTeam, PlayerView, PowerUpEffect, PowerUpKind, QuestionView,
    RoomCode, SessionStatus, StateSnapshot, Team,
};

use crate::{
    powerup, AdvancePlan, AnswerOutcome, GameConfig, ModeState, PowerUpError,
    Question, QuestionDeck, QuestionSource, RejectReason, RoundCoordinator,
    SessionError,
};

/// Result of a graded submission, including its consequences.
#[derive(Debug, PartialEq)]
pub struct SubmitOutcome {
    pub outcome: AnswerOutcome,
    /// Set when this answer ended the game.
    pub winner: Option<Team>,
    /// How to schedule the next question; `None` when the game ended or
    /// another advance is already warranted elsewhere.
    pub plan: Option<AdvancePlan>,
}

/// Result of a successful power-up activation.
#[derive(Debug, PartialEq)]
pub struct PowerUpOutcome {
    pub team: Team,
    pub effect: PowerUpEffect,
}

/// One second of game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// The clock ticked down; broadcast the remaining seconds.
    Running(u32),
    /// The clock hit zero; the game is over.
    Expired(Team),
    /// The game is not running; nothing to tick.
    Idle,
}

pub struct GameSession {
    code: RoomCode,
    mode: GameMode,
    status: SessionStatus,
    config: GameConfig,
    roster: crate::Roster,
    mode_state: ModeState,
    round: RoundCoordinator,
    team_scores: PerTeam<u32>,
    quiz: Box<dyn QuestionSource + Send>,
    time_left: u32,
}

impl GameSession {
    pub fn new(code: RoomCode, mode: GameMode, config: GameConfig) -> Self {
        Self::with_questions(code, mode, config, Box::new(QuestionDeck::builtin()))
    }

    /// Builds a session over a caller-supplied question source.
    pub fn with_questions(
        code: RoomCode,
        mode: GameMode,
        config: GameConfig,
        quiz: Box<dyn QuestionSource + Send>,
    ) -> Self {
        let mode_state = ModeState::new(mode, &config);
        let time_left = config.game_duration_secs;
        Self {
            code,
            mode,
            status: SessionStatus::Waiting,
            config,
            roster: crate::Roster::new(),
            mode_state,
            round: RoundCoordinator::new(),
            team_scores: PerTeam::default(),
            quiz,
            time_left,
        }
    }

    // -- membership ---------------------------------------------------------

    /// Adds a player, auto-assigning a team unless one is preferred.
    ///
    /// # Errors
    /// [`SessionError::GameInProgress`] while the game is playing. Joining
    /// a finished room is allowed (players arrive for the rematch).
    pub fn join(
        &mut self,
        id: quizclash_protocol::PlayerId,
        name: &str,
        preferred_team: Option<Team>,
    ) -> Result<PlayerView, SessionError> {
        if self.status == SessionStatus::Playing {
            return Err(SessionError::GameInProgress);
        }
        let player = self.roster.add_player(id, name, preferred_team);
        debug!(room = %self.code, player = %player.id, team = %player.team, "player joined");
        Ok(player.view())
    }

    /// Removes a player and reports how many remain.
    pub fn leave(&mut self, id: quizclash_protocol::PlayerId) -> usize {
        self.roster.remove_player(id);
        self.roster.len()
    }

    pub fn switch_team(&mut self, id: quizclash_protocol::PlayerId) -> Option<Team> {
        self.roster.switch_team(id)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Starts the game from the waiting state.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Waiting {
            return Err(SessionError::AlreadyStarted(self.status));
        }
        self.begin();
        Ok(())
    }

    /// Rematch: restarts from any state with the same roster and mode.
    pub fn reset(&mut self) {
        self.begin();
    }

    fn begin(&mut self) {
        self.mode_state = ModeState::new(self.mode, &self.config);
        self.round.reset();
        self.team_scores = PerTeam::default();
        self.roster.reset_for_new_game();
        self.quiz.reset();
        self.time_left = self.config.game_duration_secs;
        self.status = SessionStatus::Playing;
        debug!(room = %self.code, mode = %self.mode, "game started");
    }

    fn finish(&mut self) -> Team {
        self.status = SessionStatus::Finished;
        let winner = self.mode_state.winner(&self.team_scores);
        debug!(room = %self.code, %winner, "game over");
        winner
    }

    /// The winner as things stand right now.
    pub fn winner(&self) -> Team {
        self.mode_state.winner(&self.team_scores)
    }

    // -- gameplay -----------------------------------------------------------

    /// Grades an answer and reports its consequences.
    ///
    /// # Errors
    /// [`RejectReason`] when the submission is invalid; no state changes
    /// in that case.
    pub fn submit_answer(
        &mut self,
        player_id: quizclash_protocol::PlayerId,
        answer_index: usize,
        claimed_team: Option<Team>,
        now: Instant,
    ) -> Result<SubmitOutcome, RejectReason> {
        if self.status != SessionStatus::Playing {
            return Err(RejectReason::GameNotRunning);
        }
        let question = self
            .quiz
            .current()
            .cloned()
            .ok_or(RejectReason::NoQuestion)?;

        let outcome = self.round.submit_answer(
            &mut self.roster,
            &mut self.mode_state,
            &mut self.team_scores,
            &question,
            player_id,
            answer_index,
            claimed_team,
            now,
            &self.config,
        )?;

        if self.mode_state.check_win() {
            let winner = self.finish();
            return Ok(SubmitOutcome {
                outcome,
                winner: Some(winner),
                plan: None,
            });
        }

        let plan = self.round.plan_advance(&outcome);
        Ok(SubmitOutcome {
            outcome,
            winner: None,
            plan,
        })
    }

    /// Consumes and activates one of `player_id`'s power-ups.
    pub fn use_power_up(
        &mut self,
        player_id: quizclash_protocol::PlayerId,
        kind: PowerUpKind,
        now: Instant,
    ) -> Result<PowerUpOutcome, PowerUpError> {
        if self.status != SessionStatus::Playing {
            return Err(PowerUpError::GameNotRunning);
        }
        let team = self
            .roster
            .player(player_id)
            .ok_or(PowerUpError::PlayerNotFound)?
            .team;
        self.roster.take_power_up(player_id, kind)?;
        let effect =
            powerup::activate(kind, team, &mut self.mode_state, now, &self.config);
        debug!(room = %self.code, %team, power_up = %kind, "power-up activated");
        Ok(PowerUpOutcome { team, effect })
    }

    /// Ticks the game clock down by one second.
    pub fn countdown_tick(&mut self) -> CountdownStep {
        if self.status != SessionStatus::Playing {
            return CountdownStep::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            CountdownStep::Expired(self.finish())
        } else {
            CountdownStep::Running(self.time_left)
        }
    }

    /// Moves to the next round and question. `None` once the game is no
    /// longer playing or the source is empty.
    pub fn advance_question(&mut self) -> Option<QuestionView> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        self.round.advance();
        self.quiz.advance();
        self.current_question()
    }

    /// Manual override: swaps the question without touching the round
    /// counter or answered flags.
    pub fn skip_question(&mut self) -> Option<QuestionView> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        self.quiz.advance();
        self.current_question()
    }

    // -- views --------------------------------------------------------------

    pub fn current_question(&self) -> Option<QuestionView> {
        self.quiz.current().map(|q| q.view(self.time_left))
    }

    /// The raw current question, answer key included. Test-only escape
    /// hatch for driving a known-correct submission.
    pub fn current_question_full(&self) -> Option<&Question> {
        self.quiz.current()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            mode: self.mode,
            status: self.status,
            meter: self.mode_state.snapshot(),
            scores: self.team_scores,
            team_red: self.roster.team_members(Team::Red),
            team_blue: self.roster.team_members(Team::Blue),
            question_index: self.quiz.index(),
            total_questions: self.quiz.len(),
            current_round: self.round.round(),
            time_left: self.time_left,
            game_duration: self.config.game_duration_secs,
            answered_teams: self.round.answered_teams(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub fn team_members(&self, team: Team) -> Vec<PlayerView> {
        self.roster.team_members(team)
    }

    pub fn player_view(&self, id: quizclash_protocol::PlayerId) -> Option<PlayerView> {
        self.roster.player(id).map(|p| p.view())
    }
}
