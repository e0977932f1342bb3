use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use peach_shared::UserId;

use crate::codec;
use crate::database::Database;
use crate::error::Result;
use crate::models::{Notification, NotificationKind};

impl Database {
    pub fn insert_notification(
        &self,
        user: UserId,
        kind: NotificationKind,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Notification> {
        let id = Uuid::new_v4();
        self.conn().execute(
            "INSERT INTO notifications (id, user_id, kind, message, created_at, read)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                id.to_string(),
                user.to_string(),
                kind.as_str(),
                message,
                codec::fmt_timestamp(&now),
            ],
        )?;

        Ok(Notification {
            id,
            user_id: user,
            kind,
            message: message.to_string(),
            created_at: now,
            read: false,
        })
    }

    /// Notifications for `user`, newest first.
    pub fn list_notifications(&self, user: UserId) -> Result<Vec<Notification>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, kind, message, created_at, read
             FROM notifications
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![user.to_string()], |row| {
            let kind_str: String = row.get(2)?;
            let kind = NotificationKind::parse(&kind_str).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "kind".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            Ok(Notification {
                id: codec::uuid(row, 0)?,
                user_id: codec::user_id(row, 1)?,
                kind,
                message: row.get(3)?,
                created_at: codec::timestamp(row, 4)?,
                read: row.get(5)?,
            })
        })?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    /// Returns `true` if the notification existed and was unread.
    pub fn mark_notification_read(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1 AND read = 0",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}
