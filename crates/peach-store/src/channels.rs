//! CRUD operations for [`Channel`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use peach_shared::{ChannelId, UserId, UserPair};

use crate::codec;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Channel;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Return the channel for `a` and `b`, creating it if needed.
    ///
    /// The insert is a single `INSERT OR IGNORE` on the deterministic id, so
    /// both participants may call this at once and still share one channel.
    pub fn get_or_create_channel(
        &self,
        a: UserId,
        b: UserId,
        now: DateTime<Utc>,
    ) -> Result<Channel> {
        self.get_or_create_channel_locked(UserPair::new(a, b)?, now)
    }

    pub(crate) fn get_or_create_channel_locked(
        &self,
        users: UserPair,
        now: DateTime<Utc>,
    ) -> Result<Channel> {
        let id = users.channel_id();
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO channels (id, user_low, user_high, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                id.as_str(),
                users.low().to_string(),
                users.high().to_string(),
                codec::fmt_timestamp(&now),
            ],
        )?;
        if inserted > 0 {
            tracing::debug!(channel = %id, "channel created");
        }
        self.get_channel(&id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single channel by id.
    pub fn get_channel(&self, id: &ChannelId) -> Result<Channel> {
        self.conn()
            .query_row(
                "SELECT id, user_low, user_high, created_at, last_message, last_message_at
                 FROM channels
                 WHERE id = ?1",
                params![id.as_str()],
                row_to_channel,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Channels `user` takes part in, most recently active first. Channels
    /// without messages come last, newest first.
    pub fn list_channels_for_user(&self, user: UserId) -> Result<Vec<Channel>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_low, user_high, created_at, last_message, last_message_at
             FROM channels
             WHERE user_low = ?1 OR user_high = ?1
             ORDER BY last_message_at IS NULL, last_message_at DESC, created_at DESC",
        )?;

        let rows = stmt.query_map(params![user.to_string()], row_to_channel)?;

        let mut channels = Vec::new();
        for row in rows {
            channels.push(row?);
        }
        Ok(channels)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Channel`].
fn row_to_channel(row: &rusqlite::Row<'_>) -> rusqlite::Result<Channel> {
    let id = codec::channel_id(row, 0)?;
    let low = codec::user_id(row, 1)?;
    let high = codec::user_id(row, 2)?;
    let participants = UserPair::new(low, high).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Channel {
        id,
        participants,
        created_at: codec::timestamp(row, 3)?,
        last_message: row.get(4)?,
        last_message_at: codec::opt_timestamp(row, 5)?,
    })
}
