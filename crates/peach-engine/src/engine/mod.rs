//! The [`MatchEngine`] service.
//!
//! Operations are grouped by concern, one file each:
//! - `ripen`: likes, quota, mutual matches and match notifications
//! - `chat`: channels, messages, read state
//! - `discover`: ranked feed and admirers
//! - `admin`: moderation and premium management

mod admin;
mod chat;
mod discover;
mod ripen;

use std::sync::Arc;

use peach_shared::{Clock, Profile, QuotaPolicy, UserId};
use peach_store::{Database, StoreError};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{Notifier, PeachEvent};

pub use chat::Conversation;
pub use discover::{AdmirerView, ScoredProfile};
pub use ripen::RipenResult;

/// Stateless facade over one store connection.
///
/// An engine owns one `Database` handle and is not `Sync`; give each worker
/// thread its own engine on the same database file and share the clock and
/// notifier between them.
pub struct MatchEngine {
    db: Database,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    policy: QuotaPolicy,
    premium_days: i64,
}

impl MatchEngine {
    pub fn new(
        db: Database,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
        notifier: Notifier,
    ) -> Self {
        Self {
            db,
            clock,
            notifier,
            policy: config.quota_policy(),
            premium_days: config.premium_days,
        }
    }

    /// Open the configured database with the wall clock and a fresh notifier.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let db = match &config.database_path {
            Some(path) => Database::open_at(path, config.busy_timeout)?,
            None => Database::open_default()?,
        };
        tracing::info!(
            daily_like_limit = config.daily_like_limit,
            utc_offset_minutes = config.utc_offset_minutes,
            "match engine ready"
        );
        Ok(Self::new(
            db,
            config,
            Arc::new(config.system_clock()),
            Notifier::new(config.notifier_capacity),
        ))
    }

    /// Subscribe to change events published after each commit.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PeachEvent> {
        self.notifier.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Direct store access, for profile CRUD the engine does not wrap.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn profile(&self, id: UserId) -> Result<Profile> {
        self.db.get_profile(id).map_err(|e| match e {
            StoreError::NotFound => EngineError::UnknownUser(id),
            other => other.into(),
        })
    }

    /// Create or edit a profile (owner-editable fields only on edit).
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.db.upsert_profile(profile)?;
        Ok(())
    }

    /// Load a profile that is allowed to act (exists and is not banned).
    fn active_profile(&self, id: UserId) -> Result<Profile> {
        let profile = self.profile(id)?;
        if profile.banned {
            tracing::warn!(user = %id, "banned user attempted an action");
            return Err(EngineError::InvalidArgument(format!("user {id} is banned")));
        }
        Ok(profile)
    }
}
