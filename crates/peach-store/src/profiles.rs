//! CRUD operations for [`Profile`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use peach_shared::{QuotaState, UserId};

use crate::codec;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{DiscoverFilter, Profile, Stats};

pub(crate) const PROFILE_COLUMNS: &str = "p.id, p.alias, p.level, p.basics, p.life, p.work, \
     p.relationships, p.vision, p.special, p.onboarding_complete, p.premium, p.premium_until, \
     p.banned, p.daily_like_count, p.daily_reset_date, p.created_at, p.updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    /// Insert a profile, or update the owner-editable fields of an existing
    /// one.
    ///
    /// On update, `premium`, `banned` and the quota counter are left alone:
    /// those belong to the admin operations and the like recorder.
    pub fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        if profile.alias.trim().is_empty() {
            return Err(StoreError::InvalidRecord("profile alias is blank".into()));
        }

        self.conn().execute(
            "INSERT INTO profiles (id, alias, level, basics, life, work, relationships,
                                   vision, special, onboarding_complete, premium, premium_until,
                                   banned, daily_like_count, daily_reset_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT(id) DO UPDATE SET
                alias               = excluded.alias,
                level               = excluded.level,
                basics              = excluded.basics,
                life                = excluded.life,
                work                = excluded.work,
                relationships       = excluded.relationships,
                vision              = excluded.vision,
                special             = excluded.special,
                onboarding_complete = excluded.onboarding_complete,
                updated_at          = excluded.updated_at",
            params![
                profile.id.to_string(),
                profile.alias.trim(),
                profile.level,
                codec::to_json(&profile.basics)?,
                codec::to_json(&profile.life)?,
                codec::to_json(&profile.work)?,
                codec::to_json(&profile.relationships)?,
                profile.vision,
                profile.special,
                profile.onboarding_complete,
                profile.premium,
                profile.premium_until.as_ref().map(codec::fmt_timestamp),
                profile.banned,
                profile.quota.count,
                profile.quota.reset_date.map(|d| d.to_string()),
                codec::fmt_timestamp(&profile.created_at),
                codec::fmt_timestamp(&profile.updated_at),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single profile by id.
    pub fn get_profile(&self, id: UserId) -> Result<Profile> {
        self.find_profile(id)?.ok_or(StoreError::NotFound)
    }

    pub fn find_profile(&self, id: UserId) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id.to_string()], row_to_profile)
            .optional()?)
    }

    /// Candidates for `viewer`'s feed: onboarded, not banned, not the viewer,
    /// and not already liked by the viewer.
    pub fn list_discoverable_profiles(
        &self,
        viewer: UserId,
        filter: &DiscoverFilter,
    ) -> Result<Vec<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profiles p
             WHERE p.id <> ?1
               AND p.onboarding_complete = 1
               AND p.banned = 0
               AND NOT EXISTS (
                   SELECT 1 FROM likes l WHERE l.actor_id = ?1 AND l.target_id = p.id
               )
               AND (?2 IS NULL OR p.level = ?2)
               AND (?3 IS NULL OR json_extract(p.life, '$.based') = ?3)
             ORDER BY p.created_at ASC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![viewer.to_string(), filter.level, filter.based],
            row_to_profile,
        )?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    /// Onboarded, non-banned profiles other than `viewer` whose alias
    /// contains `query` (ASCII case-insensitive), alphabetical.
    pub fn search_profiles(&self, viewer: UserId, query: &str, limit: u32) -> Result<Vec<Profile>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));

        let sql = format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profiles p
             WHERE p.id <> ?1
               AND p.onboarding_complete = 1
               AND p.banned = 0
               AND p.alias LIKE ?2 ESCAPE '\\'
             ORDER BY p.alias COLLATE NOCASE ASC
             LIMIT ?3"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![viewer.to_string(), pattern, limit],
            row_to_profile,
        )?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    /// Counts for the admin dashboard. Expired premium does not count.
    pub fn stats(&self, now: DateTime<Utc>) -> Result<Stats> {
        let (total, premium, banned): (i64, i64, i64) = self.conn().query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(premium = 1 AND (premium_until IS NULL OR premium_until > ?1)), 0),
                    COALESCE(SUM(banned = 1), 0)
             FROM profiles",
            params![codec::fmt_timestamp(&now)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(Stats {
            total_users: total as u64,
            premium_users: premium as u64,
            banned_users: banned as u64,
        })
    }

    // ------------------------------------------------------------------
    // Admin updates
    // ------------------------------------------------------------------

    /// Set or clear the ban flag. Returns `false` if the profile is unknown.
    pub fn set_banned(&self, id: UserId, banned: bool, now: DateTime<Utc>) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE profiles SET banned = ?1, updated_at = ?2 WHERE id = ?3",
            params![banned, codec::fmt_timestamp(&now), id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Grant (`Some(until)` / `None` for no expiry) or revoke premium.
    pub fn set_premium(
        &self,
        id: UserId,
        premium: bool,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE profiles SET premium = ?1, premium_until = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                premium,
                until.filter(|_| premium).as_ref().map(codec::fmt_timestamp),
                codec::fmt_timestamp(&now),
                id.to_string(),
            ],
        )?;
        Ok(affected > 0)
    }

    /// Hard-delete a profile. Likes, matches, channels, messages and
    /// notifications involving it go with it.
    pub fn delete_profile(&self, id: UserId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM profiles WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Map a row selected with [`PROFILE_COLUMNS`] to a [`Profile`].
pub(crate) fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    let count: i64 = row.get(13)?;

    Ok(Profile {
        id: codec::user_id(row, 0)?,
        alias: row.get(1)?,
        level: row.get(2)?,
        basics: codec::opt_json(row, 3)?,
        life: codec::opt_json(row, 4)?,
        work: codec::opt_json(row, 5)?,
        relationships: codec::opt_json(row, 6)?,
        vision: row.get(7)?,
        special: row.get(8)?,
        onboarding_complete: row.get(9)?,
        premium: row.get(10)?,
        premium_until: codec::opt_timestamp(row, 11)?,
        banned: row.get(12)?,
        quota: QuotaState {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            reset_date: codec::opt_date(row, 14)?,
        },
        created_at: codec::timestamp(row, 15)?,
        updated_at: codec::timestamp(row, 16)?,
    })
}
