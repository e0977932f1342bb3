use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use peach_shared::{ChannelId, UserId};

use crate::codec;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;

const MESSAGE_COLUMNS: &str = "seq, id, channel_id, sender_id, content, created_at, read";

impl Database {
    /// Append a message to `channel` and refresh its last-message preview.
    pub fn send_message(
        &self,
        channel: &ChannelId,
        sender: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(StoreError::InvalidRecord("message content is empty".into()));
        }
        if !channel.participants()?.contains(sender) {
            return Err(StoreError::InvalidRecord(format!(
                "{sender} is not a participant of {channel}"
            )));
        }

        let tx = self.immediate()?;
        // surfaces NotFound before the foreign key does
        self.get_channel(channel)?;

        let id = Uuid::new_v4();
        let created_at = codec::fmt_timestamp(&now);
        self.conn().execute(
            "INSERT INTO messages (id, channel_id, sender_id, content, created_at, read)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                id.to_string(),
                channel.as_str(),
                sender.to_string(),
                content,
                created_at,
            ],
        )?;
        let seq = self.conn().last_insert_rowid();

        self.conn().execute(
            "UPDATE channels SET last_message = ?1, last_message_at = ?2 WHERE id = ?3",
            params![content, created_at, channel.as_str()],
        )?;
        tx.commit()?;

        Ok(Message {
            seq,
            id,
            channel_id: channel.clone(),
            sender_id: sender,
            content: content.to_string(),
            created_at: now,
            read: false,
        })
    }

    /// Every message in `channel`, oldest first.
    pub fn list_messages(&self, channel: &ChannelId) -> Result<Vec<Message>> {
        self.list_messages_after(channel, 0, u32::MAX)
    }

    /// Up to `limit` messages with `seq > after_seq`, oldest first. Polling
    /// clients pass the last `seq` they have seen.
    pub fn list_messages_after(
        &self,
        channel: &ChannelId,
        after_seq: i64,
        limit: u32,
    ) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM messages
             WHERE channel_id = ?1 AND seq > ?2
             ORDER BY seq ASC
             LIMIT ?3"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![channel.as_str(), after_seq, i64::from(limit)],
            row_to_message,
        )?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Mark every unread message in `channel` not sent by `reader` as read.
    /// Returns how many changed; a repeat call returns 0.
    pub fn mark_read(&self, channel: &ChannelId, reader: UserId) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE messages SET read = 1
             WHERE channel_id = ?1 AND sender_id <> ?2 AND read = 0",
            params![channel.as_str(), reader.to_string()],
        )?;
        Ok(affected)
    }

    /// Messages in `channel` that `reader` has not read yet.
    pub fn unread_count(&self, channel: &ChannelId, reader: UserId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM messages
             WHERE channel_id = ?1 AND sender_id <> ?2 AND read = 0",
            params![channel.as_str(), reader.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        seq: row.get(0)?,
        id: codec::uuid(row, 1)?,
        channel_id: codec::channel_id(row, 2)?,
        sender_id: codec::user_id(row, 3)?,
        content: row.get(4)?,
        created_at: codec::timestamp(row, 5)?,
        read: row.get(6)?,
    })
}
