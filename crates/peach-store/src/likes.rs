//! Like ("ripen") recording with the daily quota.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use peach_shared::{QuotaPolicy, QuotaState, UserId};

use crate::codec;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{LikeOutcome, Profile};
use crate::profiles::{row_to_profile, PROFILE_COLUMNS};

/// Quota-relevant slice of the actor's profile row.
struct ActorQuota {
    banned: bool,
    premium: bool,
    premium_until: Option<DateTime<Utc>>,
    state: QuotaState,
}

impl ActorQuota {
    fn is_premium_at(&self, now: DateTime<Utc>) -> bool {
        self.premium && self.premium_until.map_or(true, |until| now < until)
    }
}

impl Database {
    /// Record `actor -> target`, applying the day rollover and the free-tier
    /// limit, all under the database write lock.
    ///
    /// Nothing is written unless the outcome is [`LikeOutcome::Recorded`].
    pub fn record_like(
        &self,
        actor: UserId,
        target: UserId,
        today: NaiveDate,
        now: DateTime<Utc>,
        policy: &QuotaPolicy,
    ) -> Result<LikeOutcome> {
        let tx = self.immediate()?;
        let outcome = self.record_like_locked(actor, target, today, now, policy)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Body of [`Database::record_like`]; the caller holds the write lock.
    pub(crate) fn record_like_locked(
        &self,
        actor: UserId,
        target: UserId,
        today: NaiveDate,
        now: DateTime<Utc>,
        policy: &QuotaPolicy,
    ) -> Result<LikeOutcome> {
        if actor == target {
            return Err(StoreError::InvalidRecord("a user cannot like themselves".into()));
        }

        let quota = self.actor_quota(actor)?;
        if quota.banned {
            return Err(StoreError::InvalidRecord(format!("user {actor} is banned")));
        }
        if !self.profile_exists(target)? {
            return Err(StoreError::NotFound);
        }

        if self.like_exists(actor, target)? {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let rolled = quota.state.rolled_over(today);
        if !quota.is_premium_at(now) && rolled.count >= policy.daily_limit {
            return Ok(LikeOutcome::QuotaExhausted);
        }

        self.conn().execute(
            "INSERT INTO likes (actor_id, target_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                actor.to_string(),
                target.to_string(),
                codec::fmt_timestamp(&now),
            ],
        )?;
        self.conn().execute(
            "UPDATE profiles SET daily_like_count = ?1, daily_reset_date = ?2 WHERE id = ?3",
            params![rolled.count + 1, today.to_string(), actor.to_string()],
        )?;

        Ok(LikeOutcome::Recorded)
    }

    /// Whether `actor` has liked `target`.
    pub fn like_exists(&self, actor: UserId, target: UserId) -> Result<bool> {
        Ok(self
            .conn()
            .query_row(
                "SELECT 1 FROM likes WHERE actor_id = ?1 AND target_id = ?2",
                params![actor.to_string(), target.to_string()],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    /// Everyone `actor` has liked, most recent first.
    pub fn liked_targets(&self, actor: UserId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(
            "SELECT target_id FROM likes WHERE actor_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![actor.to_string()], |row| codec::user_id(row, 0))?;

        let mut targets = Vec::new();
        for row in rows {
            targets.push(row?);
        }
        Ok(targets)
    }

    /// Profiles that liked `user` and have not been liked back, most recent
    /// first.
    pub fn admirers(&self, user: UserId) -> Result<Vec<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS}
             FROM likes l
             JOIN profiles p ON p.id = l.actor_id
             WHERE l.target_id = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM likes r WHERE r.actor_id = ?1 AND r.target_id = l.actor_id
               )
             ORDER BY l.created_at DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user.to_string()], row_to_profile)?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    pub fn admirer_count(&self, user: UserId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM likes l
             WHERE l.target_id = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM likes r WHERE r.actor_id = ?1 AND r.target_id = l.actor_id
               )",
            params![user.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn profile_exists(&self, id: UserId) -> Result<bool> {
        Ok(self
            .conn()
            .query_row(
                "SELECT 1 FROM profiles WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    fn actor_quota(&self, actor: UserId) -> Result<ActorQuota> {
        self.conn()
            .query_row(
                "SELECT banned, premium, premium_until, daily_like_count, daily_reset_date
                 FROM profiles WHERE id = ?1",
                params![actor.to_string()],
                |row| {
                    let count: i64 = row.get(3)?;
                    Ok(ActorQuota {
                        banned: row.get(0)?,
                        premium: row.get(1)?,
                        premium_until: codec::opt_timestamp(row, 2)?,
                        state: QuotaState {
                            count: u32::try_from(count).unwrap_or(u32::MAX),
                            reset_date: codec::opt_date(row, 4)?,
                        },
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }
}
