//! Round orchestration: one answer per team per question, grading, and
//! the decision of when (and why) to move to the next question.

use std::time::Instant;

use quizclash_protocol::{Action, PerTeam, Team};

use crate::{GameConfig, ModeState, Question, RejectReason, Roster};

/// What a graded answer produced, for broadcasting.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// The text of the right option, revealed once the team has answered.
    pub correct_answer: String,
    pub team: Team,
    pub player_name: String,
    pub points_earned: u32,
    pub action: Action,
}

/// How the room should schedule the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePlan {
    /// A team answered correctly: short delay so clients can animate.
    AfterCorrect,
    /// Both teams answered and both were wrong: longer pause.
    BothWrong,
    /// One team answered wrong and the other may never engage; a fallback
    /// deadline keeps the room from stalling.
    Stalled,
}

/// Per-question answer bookkeeping. Reset on every advance.
#[derive(Debug)]
pub struct RoundCoordinator {
    round: u32,
    answered: PerTeam<bool>,
    any_correct: bool,
}

impl Default for RoundCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundCoordinator {
    pub fn new() -> Self {
        Self {
            round: 1,
            answered: PerTeam::default(),
            any_correct: false,
        }
    }

    /// Grades one submission.
    ///
    /// Validation order matters: membership, team claim, freeze, then the
    /// one-answer-per-round check. The team is marked as answered before
    /// grading, so even a wrong answer consumes the round slot.
    ///
    /// A `claimed_team` different from the player's own is honored only in
    /// single-player rooms (one device driving both teams).
    #[allow(clippy::too_many_arguments)]
    pub fn submit_answer(
        &mut self,
        roster: &mut Roster,
        mode: &mut ModeState,
        team_scores: &mut PerTeam<u32>,
        question: &Question,
        player_id: quizclash_protocol::PlayerId,
        answer_index: usize,
        claimed_team: Option<Team>,
        now: Instant,
        cfg: &GameConfig,
    ) -> Result<AnswerOutcome, RejectReason> {
        let solo = roster.len() == 1;
        let player = roster
            .player(player_id)
            .ok_or(RejectReason::PlayerNotFound)?;

        let team = match claimed_team {
            Some(claimed) if claimed != player.team => {
                if solo {
                    claimed
                } else {
                    return Err(RejectReason::WrongTeam);
                }
            }
            _ => player.team,
        };

        if mode.is_frozen(team, now) {
            return Err(RejectReason::Frozen);
        }
        if self.answered[team] {
            return Err(RejectReason::AlreadyAnswered);
        }
        self.answered[team] = true;

        let correct = answer_index == question.correct_index;
        let correct_answer = question
            .options
            .get(question.correct_index)
            .cloned()
            .unwrap_or_default();
        let player = roster
            .player_mut(player_id)
            .ok_or(RejectReason::PlayerNotFound)?;
        let player_name = player.name.clone();

        let (points_earned, action) = if correct {
            player.streak += 1;
            let mut points = cfg.base_points;
            if player.streak > cfg.streak_threshold {
                points += cfg.streak_bonus;
            }
            player.score += points;
            team_scores[team] += points;
            self.any_correct = true;
            (points, mode.apply_correct_answer(team))
        } else {
            player.streak = 0;
            (0, Action::Wrong)
        };

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            team,
            player_name,
            points_earned,
            action,
        })
    }

    /// Decides whether (and how) to schedule the next question after the
    /// given outcome.
    pub fn plan_advance(&self, outcome: &AnswerOutcome) -> Option<AdvancePlan> {
        let complete = self.is_round_complete();
        if outcome.correct {
            Some(AdvancePlan::AfterCorrect)
        } else if complete && !self.any_correct {
            Some(AdvancePlan::BothWrong)
        } else if !complete {
            Some(AdvancePlan::Stalled)
        } else {
            // The other team already landed a correct answer; its advance
            // is in flight.
            None
        }
    }

    /// Moves to the next round, clearing per-question flags.
    pub fn advance(&mut self) {
        self.round += 1;
        self.answered = PerTeam::default();
        self.any_correct = false;
    }

    /// Back to round one (game start or rematch).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_round_complete(&self) -> bool {
        self.answered.red && self.answered.blue
    }

    pub fn has_answered(&self, team: Team) -> bool {
        self.answered[team]
    }

    pub fn answered_teams(&self) -> Vec<Team> {
        [Team::Red, Team::Blue]
            .into_iter()
            .filter(|t| self.answered[*t])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use quizclash_protocol::{GameMode, PlayerId};

    use super::*;

    struct Fixture {
        roster: Roster,
        mode: ModeState,
        scores: PerTeam<u32>,
        question: Question,
        cfg: GameConfig,
        round: RoundCoordinator,
    }

    fn fixture() -> Fixture {
        let cfg = GameConfig::default();
        let mut roster = Roster::new();
        roster.add_player(PlayerId(1), "red-player", Some(Team::Red));
        roster.add_player(PlayerId(2), "blue-player", Some(Team::Blue));
        Fixture {
            roster,
            mode: ModeState::new(GameMode::TugOfWar, &cfg),
            scores: PerTeam::default(),
            question: Question {
                id: 1,
                text: "2 + 2?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_index: 1,
                category: "Math".into(),
                difficulty: "easy".into(),
            },
            cfg,
            round: RoundCoordinator::new(),
        }
    }

    fn submit(
        f: &mut Fixture,
        player: u64,
        answer: usize,
    ) -> Result<AnswerOutcome, RejectReason> {
        f.round.submit_answer(
            &mut f.roster,
            &mut f.mode,
            &mut f.scores,
            &f.question,
            PlayerId(player),
            answer,
            None,
            Instant::now(),
            &f.cfg,
        )
    }

    #[test]
    fn test_correct_answer_scores_and_moves_meter() {
        let mut f = fixture();
        let outcome = submit(&mut f, 1, 1).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.points_earned, 10);
        assert_eq!(outcome.correct_answer, "4");
        assert_eq!(outcome.action, Action::Pull { team: Team::Red, position: -8 });
        assert_eq!(f.scores.red, 10);
        assert_eq!(f.roster.player(PlayerId(1)).unwrap().streak, 1);
    }

    #[test]
    fn test_wrong_answer_consumes_round_slot_and_resets_streak() {
        let mut f = fixture();
        f.roster.player_mut(PlayerId(1)).unwrap().streak = 2;
        let outcome = submit(&mut f, 1, 0).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.points_earned, 0);
        assert_eq!(outcome.action, Action::Wrong);
        assert_eq!(f.roster.player(PlayerId(1)).unwrap().streak, 0);
        // The slot is gone even though the answer was wrong.
        assert_eq!(submit(&mut f, 1, 1), Err(RejectReason::AlreadyAnswered));
    }

    #[test]
    fn test_streak_bonus_kicks_in_above_threshold() {
        let mut f = fixture();
        f.roster.player_mut(PlayerId(1)).unwrap().streak = 3;
        let outcome = submit(&mut f, 1, 1).unwrap();
        // Streak becomes 4, which is past the threshold of 3.
        assert_eq!(outcome.points_earned, 15);
    }

    #[test]
    fn test_claimed_team_rejected_in_multiplayer_room() {
        let mut f = fixture();
        let result = f.round.submit_answer(
            &mut f.roster,
            &mut f.mode,
            &mut f.scores,
            &f.question,
            PlayerId(1),
            1,
            Some(Team::Blue),
            Instant::now(),
            &f.cfg,
        );
        assert_eq!(result, Err(RejectReason::WrongTeam));
    }

    #[test]
    fn test_claimed_team_honored_when_solo() {
        let mut f = fixture();
        f.roster.remove_player(PlayerId(2));
        let outcome = f
            .round
            .submit_answer(
                &mut f.roster,
                &mut f.mode,
                &mut f.scores,
                &f.question,
                PlayerId(1),
                1,
                Some(Team::Blue),
                Instant::now(),
                &f.cfg,
            )
            .unwrap();
        assert_eq!(outcome.team, Team::Blue);
        assert_eq!(f.scores.blue, 10);
        // Both slots are independent for the one device.
        assert!(f.round.has_answered(Team::Blue));
        assert!(!f.round.has_answered(Team::Red));
    }

    #[test]
    fn test_frozen_team_is_rejected() {
        let mut f = fixture();
        let now = Instant::now();
        f.mode.freeze(Team::Red, now + std::time::Duration::from_secs(5));
        assert_eq!(submit(&mut f, 1, 1), Err(RejectReason::Frozen));
        // Freeze rejections do not consume the answer slot.
        assert!(!f.round.has_answered(Team::Red));
    }

    #[test]
    fn test_plan_after_correct() {
        let mut f = fixture();
        let outcome = submit(&mut f, 1, 1).unwrap();
        assert_eq!(f.round.plan_advance(&outcome), Some(AdvancePlan::AfterCorrect));
    }

    #[test]
    fn test_plan_both_wrong() {
        let mut f = fixture();
        let first = submit(&mut f, 1, 0).unwrap();
        assert_eq!(f.round.plan_advance(&first), Some(AdvancePlan::Stalled));
        let second = submit(&mut f, 2, 0).unwrap();
        assert_eq!(f.round.plan_advance(&second), Some(AdvancePlan::BothWrong));
    }

    #[test]
    fn test_no_plan_when_other_team_already_correct() {
        let mut f = fixture();
        submit(&mut f, 1, 1).unwrap();
        let wrong = submit(&mut f, 2, 0).unwrap();
        assert_eq!(f.round.plan_advance(&wrong), None);
    }

    #[test]
    fn test_advance_clears_round_state() {
        let mut f = fixture();
        submit(&mut f, 1, 1).unwrap();
        assert_eq!(f.round.answered_teams(), vec![Team::Red]);
        f.round.advance();
        assert_eq!(f.round.round(), 2);
        assert!(f.round.answered_teams().is_empty());
        assert!(submit(&mut f, 1, 1).is_ok());
    }
}
