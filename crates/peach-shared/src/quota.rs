//! Daily like allowance.
//!
//! This module only computes; it never mutates stored state. The store applies
//! the day rollover together with the increment inside one transaction, using
//! [`QuotaState::rolled_over`] so both sides agree on what "reset" means.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DAILY_LIKE_LIMIT, PREMIUM_ALLOWANCE_SENTINEL};

/// Per-user counter of likes recorded on `reset_date`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub count: u32,
    /// Calendar day `count` refers to. `None` until the first like.
    pub reset_date: Option<NaiveDate>,
}

impl QuotaState {
    /// The count as it would be after applying a rollover to `today`.
    pub fn effective_count(&self, today: NaiveDate) -> u32 {
        if self.reset_date == Some(today) {
            self.count
        } else {
            0
        }
    }

    /// The state with the rollover to `today` applied.
    pub fn rolled_over(&self, today: NaiveDate) -> Self {
        Self {
            count: self.effective_count(today),
            reset_date: Some(today),
        }
    }
}

/// Remaining likes for today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "remaining", rename_all = "snake_case")]
pub enum Allowance {
    /// Premium: never limited.
    Unlimited,
    Remaining(u32),
    /// Free tier limit reached; the UI should offer an upgrade.
    Exhausted,
}

impl Allowance {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Allowance::Exhausted)
    }

    /// Number to show in the UI, with premium reported as the sentinel.
    pub fn display_count(&self, policy: &QuotaPolicy) -> u32 {
        match self {
            Allowance::Unlimited => policy.premium_sentinel,
            Allowance::Remaining(n) => *n,
            Allowance::Exhausted => 0,
        }
    }
}

/// Limits applied to the daily counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Free-tier likes per calendar day.
    pub daily_limit: u32,
    /// Allowance displayed for premium users.
    pub premium_sentinel: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIKE_LIMIT,
            premium_sentinel: PREMIUM_ALLOWANCE_SENTINEL,
        }
    }
}

impl QuotaPolicy {
    /// Would-be allowance for a user on `today`, without resetting anything.
    pub fn check(&self, state: &QuotaState, premium: bool, today: NaiveDate) -> Allowance {
        if premium {
            return Allowance::Unlimited;
        }
        let used = state.effective_count(today);
        if used >= self.daily_limit {
            Allowance::Exhausted
        } else {
            Allowance::Remaining(self.daily_limit - used)
        }
    }
}
