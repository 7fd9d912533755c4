use crate::state::State;
use crate::types::{MaxRounds, TimeToLive};
use std::fmt::{Display, Formatter};
use tracing::instrument;

/// How a run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RunOutcome {
    /// The target replied and every round was completed.
    DestinationReached,
    /// More consecutive hops than allowed never replied.
    UnknownHopLimitExceeded,
    /// The maximum hops were probed without reaching the target.
    MaxHopsExceeded,
    /// Every round was completed without reaching the target.
    RoundsExhausted,
    /// The run was cancelled.
    Cancelled,
}

impl RunOutcome {
    /// Did the run reach the target?
    #[must_use]
    pub const fn is_reached(self) -> bool {
        matches!(self, Self::DestinationReached)
    }
}

impl Display for RunOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DestinationReached => write!(f, "destination reached"),
            Self::UnknownHopLimitExceeded => {
                write!(f, "did not reach destination (unknown hop limit exceeded)")
            }
            Self::MaxHopsExceeded => write!(f, "did not reach destination (max hops exceeded)"),
            Self::RoundsExhausted => write!(f, "did not reach destination"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The verdict after a round.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Completion {
    /// Start another round.
    Continue,
    /// Stop and report the outcome.
    Finished(RunOutcome),
}

/// Decides whether a run is finished after each round.
#[derive(Debug, Clone, Copy)]
pub struct CompletionDetector {
    max_rounds: MaxRounds,
    max_hops: TimeToLive,
    max_unknown_hops: u8,
}

impl CompletionDetector {
    #[must_use]
    pub const fn new(max_rounds: MaxRounds, max_hops: TimeToLive, max_unknown_hops: u8) -> Self {
        Self {
            max_rounds,
            max_hops,
            max_unknown_hops,
        }
    }

    /// Evaluate the hop table at the end of a round.
    ///
    /// The checks are made in order:
    ///
    /// 1 - if a run of consecutive probed hops which never replied is longer than
    ///     `max_unknown_hops` and the target has not replied, finish
    /// 2 - until all rounds are complete, continue
    /// 3 - if any hop last replied from the target, the destination was reached
    /// 4 - if the maximum hop was probed, the max hops were exceeded
    /// 5 - otherwise the rounds were exhausted
    ///
    /// Probing the maximum hop does not end the run early, a target at the
    /// last hop which misses a single reply is still probed in every round.
    #[instrument(skip(self, state), ret, level = "trace")]
    pub fn evaluate(&self, state: &State) -> Completion {
        let reached = state.reached_ttl().is_some();
        if !reached && longest_unknown_run(state) > usize::from(self.max_unknown_hops) {
            Completion::Finished(RunOutcome::UnknownHopLimitExceeded)
        } else if state.round_count() < self.max_rounds.0.get() {
            Completion::Continue
        } else if reached {
            Completion::Finished(RunOutcome::DestinationReached)
        } else if state.highest_probed_ttl() >= Some(self.max_hops) {
            Completion::Finished(RunOutcome::MaxHopsExceeded)
        } else {
            Completion::Finished(RunOutcome::RoundsExhausted)
        }
    }
}

/// The longest run of consecutive probed hops without an address.
fn longest_unknown_run(state: &State) -> usize {
    state
        .hops()
        .iter()
        .take_while(|hop| hop.sent() > 0)
        .fold((0, 0), |(longest, current), hop| {
            if hop.addr().is_none() {
                (longest.max(current + 1), current + 1)
            } else {
                (longest, 0)
            }
        })
        .0
}
