//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. No shared mutable state, just message
//! passing, so the JavaScript-style "one event at a time" race freedom
//! holds here per room. The actor also owns the room's timers and folds
//! them into the same `select!` loop, which means a timer can never fire
//! concurrently with a command.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use quizclash_game::{
    AdvancePlan, CountdownStep, GameConfig, GameSession, SubmitOutcome,
};
use quizclash_protocol::{
    GameMode, PlayerId, PlayerView, PowerUpKind, Recipient, RoomCode,
    RoomSummary, ServerEvent, SwitchedPlayer, Team,
};
use quizclash_timer::{AdvanceKind, RoomTimers};

use crate::RoomError;

/// Channel for delivering server events to one player's connection task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// What a successful join hands back to the connection handler.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub room_code: RoomCode,
    pub player: PlayerView,
    pub team: Team,
}

/// Commands sent to a room actor through its channel. The `oneshot`
/// senders are reply channels for the few operations whose caller needs
/// an answer; the rest are fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        preferred_team: Option<Team>,
        sender: EventSender,
        reply: oneshot::Sender<Result<JoinedRoom, RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },
    SwitchTeam {
        player_id: PlayerId,
    },
    StartGame {
        player_id: PlayerId,
    },
    SubmitAnswer {
        player_id: PlayerId,
        answer_index: usize,
        team: Option<Team>,
    },
    UsePowerUp {
        player_id: PlayerId,
        kind: PowerUpKind,
    },
    NextQuestion,
    Rematch,
    Info {
        reply: oneshot::Sender<RoomSummary>,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone; an `mpsc::Sender`
/// plus the room code for error reporting.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Adds a player to the room, registering their outbound channel.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        preferred_team: Option<Team>,
        sender: EventSender,
    ) -> Result<JoinedRoom, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name,
                preferred_team,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Removes a player and reports how many remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    pub async fn switch_team(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::SwitchTeam { player_id }).await
    }

    pub async fn start_game(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::StartGame { player_id }).await
    }

    pub async fn submit_answer(
        &self,
        player_id: PlayerId,
        answer_index: usize,
        team: Option<Team>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::SubmitAnswer {
            player_id,
            answer_index,
            team,
        })
        .await
    }

    pub async fn use_power_up(
        &self,
        player_id: PlayerId,
        kind: PowerUpKind,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::UsePowerUp { player_id, kind }).await
    }

    pub async fn next_question(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::NextQuestion).await
    }

    pub async fn rematch(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Rematch).await
    }

    pub async fn info(&self) -> Result<RoomSummary, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// What woke the actor loop up.
enum Wake {
    Command(Option<RoomCommand>),
    CountdownTick,
    AdvanceDue(AdvanceKind),
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    session: GameSession,
    timers: RoomTimers,
    senders: HashMap<PlayerId, EventSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room = %self.session.code(), mode = %self.session.mode(), "room actor started");

        loop {
            let wake = tokio::select! {
                cmd = self.receiver.recv() => Wake::Command(cmd),
                _ = self.timers.countdown.tick() => Wake::CountdownTick,
                kind = self.timers.advance.due() => Wake::AdvanceDue(kind),
            };

            match wake {
                Wake::Command(Some(cmd)) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                // All handles dropped: the registry is gone, stop.
                Wake::Command(None) => break,
                Wake::CountdownTick => self.handle_countdown_tick(),
                Wake::AdvanceDue(kind) => self.handle_advance_due(kind),
            }
        }

        info!(room = %self.session.code(), "room actor stopped");
    }

    /// Returns `true` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                preferred_team,
                sender,
                reply,
            } => {
                let result = self.handle_join(player_id, &name, preferred_team, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let remaining = self.handle_leave(player_id);
                let _ = reply.send(remaining);
            }
            RoomCommand::SwitchTeam { player_id } => self.handle_switch_team(player_id),
            RoomCommand::StartGame { player_id } => self.handle_start_game(player_id),
            RoomCommand::SubmitAnswer {
                player_id,
                answer_index,
                team,
            } => self.handle_submit_answer(player_id, answer_index, team),
            RoomCommand::UsePowerUp { player_id, kind } => {
                self.handle_use_power_up(player_id, kind)
            }
            RoomCommand::NextQuestion => self.handle_next_question(),
            RoomCommand::Rematch => self.handle_rematch(),
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.summary());
            }
            RoomCommand::Shutdown => {
                debug!(room = %self.session.code(), "room shutting down");
                self.timers.clear();
                return true;
            }
        }
        false
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        preferred_team: Option<Team>,
        sender: EventSender,
    ) -> Result<JoinedRoom, RoomError> {
        let player = self
            .session
            .join(player_id, name, preferred_team)
            .map_err(|_| RoomError::GameInProgress(self.session.code().clone()))?;
        self.senders.insert(player_id, sender);

        // Tell everyone already here; the joiner gets the ack instead.
        if self.session.player_count() > 1 {
            let event = ServerEvent::PlayerJoined {
                player: player.clone(),
                team_red: self.session.team_members(Team::Red),
                team_blue: self.session.team_members(Team::Blue),
            };
            for (id, sender) in &self.senders {
                if *id != player_id {
                    let _ = sender.send(event.clone());
                }
            }
        }

        Ok(JoinedRoom {
            room_code: self.session.code().clone(),
            team: player.team,
            player,
        })
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> usize {
        self.senders.remove(&player_id);
        let remaining = self.session.leave(player_id);
        if remaining > 0 {
            self.broadcast(ServerEvent::PlayerLeft {
                player_id,
                team_red: self.session.team_members(Team::Red),
                team_blue: self.session.team_members(Team::Blue),
            });
        }
        remaining
    }

    fn handle_switch_team(&mut self, player_id: PlayerId) {
        if let Some(team) = self.session.switch_team(player_id) {
            self.broadcast(ServerEvent::TeamsUpdated {
                team_red: self.session.team_members(Team::Red),
                team_blue: self.session.team_members(Team::Blue),
                switched_player: SwitchedPlayer { id: player_id, team },
            });
        }
    }

    fn handle_start_game(&mut self, player_id: PlayerId) {
        if let Err(err) = self.session.start() {
            self.send_to(player_id, ServerEvent::Error {
                message: err.to_string(),
            });
            return;
        }
        let Some(question) = self.session.current_question() else {
            warn!(room = %self.session.code(), "started with an empty question source");
            self.send_to(player_id, ServerEvent::Error {
                message: "no questions available".into(),
            });
            return;
        };
        self.timers.countdown.start(Duration::from_secs(1));
        self.broadcast(ServerEvent::GameStarted {
            mode: self.session.mode(),
            state: self.session.snapshot(),
            question,
        });
    }

    fn handle_submit_answer(
        &mut self,
        player_id: PlayerId,
        answer_index: usize,
        team: Option<Team>,
    ) {
        let result =
            self.session
                .submit_answer(player_id, answer_index, team, Instant::now());
        let SubmitOutcome {
            outcome,
            winner,
            plan,
        } = match result {
            Ok(submit) => submit,
            Err(reason) => {
                self.send_to(player_id, ServerEvent::AnswerRejected {
                    reason: reason.to_string(),
                });
                return;
            }
        };

        self.broadcast(ServerEvent::AnswerResult {
            correct: outcome.correct,
            correct_answer: outcome.correct_answer.clone(),
            points_earned: outcome.points_earned,
            team: outcome.team,
            player_name: outcome.player_name.clone(),
        });
        self.broadcast(ServerEvent::StateUpdate {
            state: self.session.snapshot(),
            last_action: outcome.action,
            team: outcome.team,
            player_name: outcome.player_name,
        });

        if let Some(winner) = winner {
            self.finish_game(winner);
        } else if let Some(plan) = plan {
            self.schedule_advance(plan);
        }
    }

    fn handle_use_power_up(&mut self, player_id: PlayerId, kind: PowerUpKind) {
        match self.session.use_power_up(player_id, kind, Instant::now()) {
            Ok(outcome) => self.broadcast(ServerEvent::PowerupActivated {
                power_up_type: kind,
                team: outcome.team,
                state: self.session.snapshot(),
                effect: outcome.effect,
            }),
            Err(err) => self.send_to(player_id, ServerEvent::PowerupFailed {
                reason: err.to_string(),
            }),
        }
    }

    fn handle_next_question(&mut self) {
        // Manual override supersedes whatever advance was pending.
        self.timers.advance.cancel();
        if let Some(question) = self.session.skip_question() {
            self.broadcast(ServerEvent::NewQuestion {
                question,
                state: self.session.snapshot(),
            });
        }
    }

    fn handle_rematch(&mut self) {
        self.timers.clear();
        self.session.reset();
        let Some(question) = self.session.current_question() else {
            return;
        };
        self.timers.countdown.start(Duration::from_secs(1));
        self.broadcast(ServerEvent::RematchStarted {
            state: self.session.snapshot(),
            question,
        });
    }

    fn handle_countdown_tick(&mut self) {
        match self.session.countdown_tick() {
            CountdownStep::Running(time_left) => {
                self.broadcast(ServerEvent::TimerTick { time_left });
            }
            CountdownStep::Expired(winner) => self.finish_game(winner),
            CountdownStep::Idle => self.timers.countdown.stop(),
        }
    }

    fn handle_advance_due(&mut self, kind: AdvanceKind) {
        match kind {
            AdvanceKind::BothWrong => self.broadcast(ServerEvent::BothWrong {
                message: "Both teams answered wrong! Moving on...".into(),
            }),
            AdvanceKind::Stalled => self.broadcast(ServerEvent::BothWrong {
                message: "Time's up for this question! Moving on...".into(),
            }),
            AdvanceKind::Correct => {}
        }
        if let Some(question) = self.session.advance_question() {
            self.broadcast(ServerEvent::NewQuestion {
                question,
                state: self.session.snapshot(),
            });
        }
    }

    fn schedule_advance(&mut self, plan: AdvancePlan) {
        let cfg = self.session.config();
        let (kind, delay) = match plan {
            AdvancePlan::AfterCorrect => {
                (AdvanceKind::Correct, cfg.correct_advance_delay)
            }
            AdvancePlan::BothWrong => (AdvanceKind::BothWrong, cfg.both_wrong_delay),
            AdvancePlan::Stalled => (AdvanceKind::Stalled, cfg.stalled_advance_delay),
        };
        // A real outcome replaces the stalled fallback, never the other
        // way around.
        if kind != AdvanceKind::Stalled {
            self.timers.advance.preempt_stalled();
        }
        if let Err(err) = self.timers.advance.schedule(kind, delay) {
            debug!(room = %self.session.code(), %err, "advance already pending");
        }
    }

    fn finish_game(&mut self, winner: Team) {
        self.timers.clear();
        self.broadcast(ServerEvent::GameOver {
            winner,
            state: self.session.snapshot(),
        });
    }

    fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.session.code().clone(),
            mode: self.session.mode(),
            players: self.session.player_count(),
            status: self.session.status(),
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        self.dispatch(Recipient::All, event);
    }

    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        self.dispatch(Recipient::Player(player_id), event);
    }

    /// Delivers an event. Dead receivers are silently skipped; the leave
    /// path cleans them up.
    fn dispatch(&self, recipient: Recipient, event: ServerEvent) {
        match recipient {
            Recipient::All => {
                for sender in self.senders.values() {
                    let _ = sender.send(event.clone());
                }
            }
            Recipient::Player(player_id) => {
                if let Some(sender) = self.senders.get(&player_id) {
                    let _ = sender.send(event);
                }
            }
        }
    }
}

/// Spawns a room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(
    code: RoomCode,
    mode: GameMode,
    config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session: GameSession::new(code.clone(), mode, config),
        timers: RoomTimers::new(),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
