use solana_program::clock::UnixTimestamp;

use crate::state::{Lottery, LotteryPhase};

/// Outcome of the eligibility predicate. All four conditions are evaluated
/// independently so callers can tell "too early" apart from "no entrants"
/// instead of getting a single opaque boolean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eligibility {
    /// Round is accepting entries (no draw outstanding)
    pub is_open: bool,
    /// At least `interval` seconds have passed since the round started
    pub interval_elapsed: bool,
    /// The round has at least one entry
    pub has_participants: bool,
    /// The pool holds a nonzero balance
    pub has_pool: bool,
}

impl Eligibility {
    pub fn ready(&self) -> bool {
        self.is_open && self.interval_elapsed && self.has_participants && self.has_pool
    }
}

/// Evaluate whether the round is ready for a draw. Pure: reads the round
/// state and the supplied clock value, mutates nothing, and may be called
/// at any frequency by an off-chain scheduler.
pub fn evaluate(lottery: &Lottery, interval: i64, now: UnixTimestamp) -> Eligibility {
    Eligibility {
        is_open: lottery.phase == LotteryPhase::Open,
        interval_elapsed: now.saturating_sub(lottery.started_at) >= interval,
        has_participants: !lottery.participants.is_empty(),
        has_pool: lottery.pool_balance > 0,
    }
}
