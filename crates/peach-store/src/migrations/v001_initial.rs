//! v001 -- Initial schema creation.
//!
//! Creates `profiles`, `likes`, `matches`, `channels`, `messages` and
//! `notifications`. Uniqueness and the match/like relationship are enforced
//! by constraints so that a lost race surfaces as a no-op insert rather than a
//! duplicate row.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Profiles
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profiles (
    id                  TEXT PRIMARY KEY NOT NULL,   -- UUID
    alias               TEXT NOT NULL,
    level               TEXT,
    basics              TEXT,                        -- JSON {fun, media}
    life                TEXT,                        -- JSON {based, upbringing}
    work                TEXT,                        -- JSON {job, reason}
    relationships       TEXT,                        -- JSON {values, lookingFor}
    vision              TEXT,
    special             TEXT,
    onboarding_complete INTEGER NOT NULL DEFAULT 0,
    premium             INTEGER NOT NULL DEFAULT 0,
    premium_until       TEXT,                        -- RFC-3339, NULL = no expiry
    banned              INTEGER NOT NULL DEFAULT 0,
    daily_like_count    INTEGER NOT NULL DEFAULT 0 CHECK (daily_like_count >= 0),
    daily_reset_date    TEXT,                        -- YYYY-MM-DD
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Likes ("ripens"): one row per ordered pair
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS likes (
    actor_id   TEXT NOT NULL,
    target_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (actor_id, target_id),
    CHECK (actor_id <> target_id),
    FOREIGN KEY (actor_id)  REFERENCES profiles(id) ON DELETE CASCADE,
    FOREIGN KEY (target_id) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_target ON likes(target_id);

-- ----------------------------------------------------------------
-- Matches: one row per unordered pair, only while both likes exist
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS matches (
    user_low   TEXT NOT NULL,
    user_high  TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (user_low, user_high),
    CHECK (user_low < user_high),
    FOREIGN KEY (user_low, user_high) REFERENCES likes(actor_id, target_id) ON DELETE CASCADE,
    FOREIGN KEY (user_high, user_low) REFERENCES likes(actor_id, target_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_matches_high ON matches(user_high);

-- ----------------------------------------------------------------
-- Channels: id = "<user_low>_<user_high>"
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS channels (
    id              TEXT PRIMARY KEY NOT NULL,
    user_low        TEXT NOT NULL,
    user_high       TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    last_message    TEXT,
    last_message_at TEXT,

    UNIQUE (user_low, user_high),
    CHECK (user_low < user_high),
    FOREIGN KEY (user_low)  REFERENCES profiles(id) ON DELETE CASCADE,
    FOREIGN KEY (user_high) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_channels_high ON channels(user_high);

-- ----------------------------------------------------------------
-- Messages: seq gives insertion order
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,             -- UUID v4
    channel_id TEXT NOT NULL,
    sender_id  TEXT NOT NULL,
    content    TEXT NOT NULL CHECK (length(trim(content)) > 0),
    created_at TEXT NOT NULL,
    read       INTEGER NOT NULL DEFAULT 0,

    FOREIGN KEY (channel_id) REFERENCES channels(id) ON DELETE CASCADE,
    FOREIGN KEY (sender_id)  REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_channel_seq ON messages(channel_id, seq);

-- ----------------------------------------------------------------
-- Notifications
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notifications (
    id         TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    user_id    TEXT NOT NULL,
    kind       TEXT NOT NULL,                    -- NotificationKind::as_str
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    read       INTEGER NOT NULL DEFAULT 0,

    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
