//! Room timers for QuizClash.
//!
//! Two clocks drive a live game: a one-second countdown over the whole
//! contest and a single-shot delay before the next question. Both are
//! plain futures meant to sit inside a room actor's `tokio::select!`
//! loop, and both pend forever when idle so the other branches keep
//! running:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = timers.countdown.tick() => { /* one second elapsed */ }
//!         kind = timers.advance.due() => { /* move to next question */ }
//!     }
//! }
//! ```
//!
//! [`RoomTimers`] keeps the two as separate public fields so a `select!`
//! can borrow each mutably in its own branch.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// The repeating game clock. Fires once per period while running; pends
/// forever while stopped.
#[derive(Debug, Default)]
pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the clock. The first tick fires one full
    /// period from now, not immediately.
    pub fn start(&mut self, period: Duration) {
        let mut interval = time::interval_at(Instant::now() + period, period);
        // A busy room should not replay missed seconds in a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        debug!(period_secs = period.as_secs_f64(), "countdown started");
    }

    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            debug!("countdown stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves on the next clock tick. Pends forever while stopped, so
    /// `select!` keeps servicing its other branches.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                trace!("countdown tick");
            }
            None => std::future::pending::<()>().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Advance slot
// ---------------------------------------------------------------------------

/// Why the next question is being scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceKind {
    /// A team answered correctly; short delay for client animation.
    Correct,
    /// Both teams answered wrong; longer pause to show the miss.
    BothWrong,
    /// Fallback so one wrong answer cannot stall the room forever.
    Stalled,
}

/// A schedule request hit a slot that already holds a pending advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an advance is already pending ({0:?})")]
pub struct AlreadyPending(pub AdvanceKind);

/// A single-shot, single-occupancy timer for the next-question delay.
///
/// Only one advance may be in flight per room; a second schedule request
/// is refused rather than silently replacing the first, so the room ends
/// up with exactly one `NewQuestion` per round no matter how the two
/// teams' answers interleave.
#[derive(Debug, Default)]
pub struct AdvanceSlot {
    pending: Option<(AdvanceKind, Instant)>,
}

impl AdvanceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the slot to fire `delay` from now.
    ///
    /// # Errors
    /// [`AlreadyPending`] when an advance is already scheduled. The
    /// existing deadline is left untouched.
    pub fn schedule(
        &mut self,
        kind: AdvanceKind,
        delay: Duration,
    ) -> Result<(), AlreadyPending> {
        if let Some((existing, _)) = self.pending {
            return Err(AlreadyPending(existing));
        }
        self.pending = Some((kind, Instant::now() + delay));
        debug!(?kind, delay_secs = delay.as_secs_f64(), "advance scheduled");
        Ok(())
    }

    /// Disarms the slot, reporting what was pending.
    pub fn cancel(&mut self) -> Option<AdvanceKind> {
        self.pending.take().map(|(kind, _)| kind)
    }

    /// Cancels the slot only if it holds a stalled-room fallback.
    ///
    /// A real outcome (correct answer, or both teams wrong) supersedes
    /// the fallback; anything else pending stays put.
    pub fn preempt_stalled(&mut self) -> bool {
        if matches!(self.pending, Some((AdvanceKind::Stalled, _))) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// What is pending, if anything.
    pub fn kind(&self) -> Option<AdvanceKind> {
        self.pending.map(|(kind, _)| kind)
    }

    /// Resolves when the pending advance comes due, taking it out of the
    /// slot. Pends forever while the slot is empty.
    pub async fn due(&mut self) -> AdvanceKind {
        match self.pending {
            Some((kind, deadline)) => {
                time::sleep_until(deadline).await;
                self.pending = None;
                kind
            }
            None => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomTimers
// ---------------------------------------------------------------------------

/// Both timers for one room. Public fields on purpose: a `select!` loop
/// needs a distinct `&mut` borrow per branch.
#[derive(Debug, Default)]
pub struct RoomTimers {
    pub countdown: Countdown,
    pub advance: AdvanceSlot,
}

impl RoomTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops everything (game over, rematch, room teardown).
    pub fn clear(&mut self) {
        self.countdown.stop();
        self.advance.cancel();
    }
}
