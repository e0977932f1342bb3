//! Mutual-match detection.
//!
//! A match row references both directed likes, so it cannot outlive either
//! of them, and its primary key on the sorted pair makes a second insert for
//! the same pair a no-op.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use peach_shared::{QuotaPolicy, UserId, UserPair};

use crate::codec;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{DetectedMatch, LikeOutcome, Match, NotificationKind, Ripen};

impl Database {
    /// Create the match for `actor`/`target` if both likes exist.
    ///
    /// Returns the match when the pair is mutual, whether this call created it
    /// or an earlier one did.
    pub fn detect_mutual(
        &self,
        actor: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<DetectedMatch>> {
        let tx = self.immediate()?;
        let detected = self.detect_mutual_locked(actor, target, now)?;
        tx.commit()?;
        Ok(detected)
    }

    /// Record a like and, if it completed a mutual pair, the match, channel
    /// and notifications, all in one transaction.
    pub fn ripen(
        &self,
        actor: UserId,
        target: UserId,
        today: NaiveDate,
        now: DateTime<Utc>,
        policy: &QuotaPolicy,
    ) -> Result<Ripen> {
        let tx = self.immediate()?;
        let outcome = self.record_like_locked(actor, target, today, now, policy)?;
        let matched = match outcome {
            LikeOutcome::Recorded => self.detect_mutual_locked(actor, target, now)?,
            LikeOutcome::AlreadyLiked | LikeOutcome::QuotaExhausted => None,
        };
        tx.commit()?;
        Ok(Ripen { outcome, matched })
    }

    fn detect_mutual_locked(
        &self,
        actor: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<DetectedMatch>> {
        let users = UserPair::new(actor, target)?;
        if !self.like_exists(target, actor)? || !self.like_exists(actor, target)? {
            return Ok(None);
        }

        let channel = self.get_or_create_channel_locked(users, now)?;
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO matches (user_low, user_high, channel_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                users.low().to_string(),
                users.high().to_string(),
                channel.id.as_str(),
                codec::fmt_timestamp(&now),
            ],
        )?;

        let created = inserted > 0;
        if created {
            for user in [users.low(), users.high()] {
                self.insert_notification(
                    user,
                    NotificationKind::Match,
                    "It's a match! You both ripened each other.",
                    now,
                )?;
            }
            tracing::info!(low = %users.low(), high = %users.high(), "match created");
        }

        let record = self.find_match(users)?.ok_or(StoreError::NotFound)?;
        Ok(Some(DetectedMatch { record, created }))
    }

    pub fn find_match(&self, users: UserPair) -> Result<Option<Match>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT user_low, user_high, channel_id, created_at
                 FROM matches WHERE user_low = ?1 AND user_high = ?2",
                params![users.low().to_string(), users.high().to_string()],
                row_to_match,
            )
            .optional()?)
    }

    /// All matches involving `user`, newest first.
    pub fn list_matches(&self, user: UserId) -> Result<Vec<Match>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_low, user_high, channel_id, created_at
             FROM matches
             WHERE user_low = ?1 OR user_high = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user.to_string()], row_to_match)?;

        let mut matches = Vec::new();
        for row in rows {
            matches.push(row?);
        }
        Ok(matches)
    }
}

fn row_to_match(row: &rusqlite::Row<'_>) -> rusqlite::Result<Match> {
    let low = codec::user_id(row, 0)?;
    let high = codec::user_id(row, 1)?;
    let users = UserPair::new(low, high).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Match {
        users,
        channel_id: codec::channel_id(row, 2)?,
        created_at: codec::timestamp(row, 3)?,
    })
}
