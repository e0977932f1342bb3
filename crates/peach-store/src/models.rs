//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peach_shared::{ChannelId, UserId, UserPair};

pub use peach_shared::Profile;

// ---------------------------------------------------------------------------
// Like ("ripen")
// ---------------------------------------------------------------------------

/// Business result of recording a like. None of these is an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LikeOutcome {
    /// The like was stored and the daily counter incremented.
    Recorded,
    /// The like already existed; nothing changed.
    AlreadyLiked,
    /// The free-tier limit is reached; nothing changed.
    QuotaExhausted,
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// Mutual like between two users, with the conversation opened for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Match {
    pub users: UserPair,
    pub channel_id: ChannelId,
    pub created_at: DateTime<Utc>,
}

/// A match found by mutual detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectedMatch {
    pub record: Match,
    /// `false` when a concurrent caller had already created it.
    pub created: bool,
}

/// Result of recording a like and detecting mutuality in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ripen {
    pub outcome: LikeOutcome,
    pub matched: Option<DetectedMatch>,
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A two-party conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub participants: UserPair,
    pub created_at: DateTime<Utc>,
    /// Denormalized preview for the conversation list.
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Store-assigned insertion order, increasing across the whole database.
    pub seq: i64,
    pub id: Uuid,
    pub channel_id: ChannelId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Match,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Match => "match",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "match" => Some(NotificationKind::Match),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

// ---------------------------------------------------------------------------
// Discovery / admin
// ---------------------------------------------------------------------------

/// Optional narrowing of the discovery feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverFilter {
    /// Only candidates whose `life.based` equals this tag.
    pub based: Option<String>,
    /// Only candidates at this study level.
    pub level: Option<String>,
}

/// User counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_users: u64,
    pub premium_users: u64,
    pub banned_users: u64,
}
