//! Engine configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine can start with zero
//! configuration for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use peach_shared::constants::{
    DEFAULT_DAILY_LIKE_LIMIT, DEFAULT_PREMIUM_DAYS, PREMIUM_ALLOWANCE_SENTINEL,
};
use peach_shared::{QuotaPolicy, SystemClock};

/// Accepted premium grant lengths, in days.
const PREMIUM_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite database file.
    /// Env: `PEACH_DB_PATH`
    /// Default: the platform data directory (`peach.db`).
    pub database_path: Option<PathBuf>,

    /// Likes a free-tier user may record per calendar day.
    /// Env: `PEACH_DAILY_LIKE_LIMIT`
    /// Default: `25`
    pub daily_like_limit: u32,

    /// Allowance reported for premium users.
    /// Env: `PEACH_PREMIUM_SENTINEL`
    /// Default: `999`
    pub premium_allowance_sentinel: u32,

    /// Offset from UTC, in minutes, at which the calendar day rolls over.
    /// Env: `PEACH_UTC_OFFSET_MINUTES`
    /// Default: `0`
    pub utc_offset_minutes: i32,

    /// How long a writer waits for a competing transaction.
    /// Env: `PEACH_BUSY_TIMEOUT_MS`
    /// Default: `5000`
    pub busy_timeout: Duration,

    /// Length of a premium grant in days.
    /// Env: `PEACH_PREMIUM_DAYS`
    /// Default: `30`
    pub premium_days: i64,

    /// Events buffered per subscriber before slow ones start lagging.
    /// Env: `PEACH_NOTIFIER_CAPACITY`
    /// Default: `256`
    pub notifier_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            daily_like_limit: DEFAULT_DAILY_LIKE_LIMIT,
            premium_allowance_sentinel: PREMIUM_ALLOWANCE_SENTINEL,
            utc_offset_minutes: 0,
            busy_timeout: Duration::from_millis(5000),
            premium_days: DEFAULT_PREMIUM_DAYS,
            notifier_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("PEACH_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        parse_into(&lookup, "PEACH_DAILY_LIKE_LIMIT", &mut config.daily_like_limit);
        parse_into(
            &lookup,
            "PEACH_PREMIUM_SENTINEL",
            &mut config.premium_allowance_sentinel,
        );
        parse_into(
            &lookup,
            "PEACH_UTC_OFFSET_MINUTES",
            &mut config.utc_offset_minutes,
        );
        if SystemClock::with_offset_minutes(config.utc_offset_minutes).is_none() {
            tracing::warn!(
                value = config.utc_offset_minutes,
                "PEACH_UTC_OFFSET_MINUTES out of range, using UTC"
            );
            config.utc_offset_minutes = 0;
        }

        let mut busy_ms = config.busy_timeout.as_millis() as u64;
        parse_into(&lookup, "PEACH_BUSY_TIMEOUT_MS", &mut busy_ms);
        config.busy_timeout = Duration::from_millis(busy_ms);

        parse_into(&lookup, "PEACH_PREMIUM_DAYS", &mut config.premium_days);
        if !PREMIUM_DAYS_RANGE.contains(&config.premium_days) {
            tracing::warn!(
                value = config.premium_days,
                "PEACH_PREMIUM_DAYS out of range, using default"
            );
            config.premium_days = DEFAULT_PREMIUM_DAYS;
        }

        parse_into(&lookup, "PEACH_NOTIFIER_CAPACITY", &mut config.notifier_capacity);
        if config.notifier_capacity == 0 {
            tracing::warn!("PEACH_NOTIFIER_CAPACITY must be positive, using 1");
            config.notifier_capacity = 1;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            daily_limit: self.daily_like_limit,
            premium_sentinel: self.premium_allowance_sentinel,
        }
    }

    pub fn system_clock(&self) -> SystemClock {
        SystemClock::with_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }
}

/// Overwrite `slot` with the parsed value of `key`, keeping the default (and
/// logging) when the value does not parse.
fn parse_into<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "invalid value, using default");
        }
    }
}
