use chrono::TimeDelta;

use peach_shared::UserId;
use peach_store::Stats;

use super::MatchEngine;
use crate::error::{EngineError, Result};

impl MatchEngine {
    pub fn ban_user(&self, user: UserId) -> Result<()> {
        self.require_updated(user, self.db.set_banned(user, true, self.clock.now())?)?;
        tracing::info!(user = %user, "user banned");
        Ok(())
    }

    pub fn unban_user(&self, user: UserId) -> Result<()> {
        self.require_updated(user, self.db.set_banned(user, false, self.clock.now())?)?;
        tracing::info!(user = %user, "user unbanned");
        Ok(())
    }

    /// Grant premium for the configured number of days from now.
    pub fn grant_premium(&self, user: UserId) -> Result<()> {
        let now = self.clock.now();
        let until = TimeDelta::try_days(self.premium_days)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!(
                    "premium length of {} days is out of range",
                    self.premium_days
                ))
            })?;
        self.require_updated(user, self.db.set_premium(user, true, Some(until), now)?)?;
        tracing::info!(user = %user, until = %until, "premium granted");
        Ok(())
    }

    pub fn revoke_premium(&self, user: UserId) -> Result<()> {
        let now = self.clock.now();
        self.require_updated(user, self.db.set_premium(user, false, None, now)?)?;
        tracing::info!(user = %user, "premium revoked");
        Ok(())
    }

    /// Remove the user and everything attached to them.
    pub fn delete_user(&self, user: UserId) -> Result<()> {
        self.require_updated(user, self.db.delete_profile(user)?)?;
        tracing::info!(user = %user, "user deleted");
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats> {
        Ok(self.db.stats(self.clock.now())?)
    }

    fn require_updated(&self, user: UserId, updated: bool) -> Result<()> {
        if updated {
            Ok(())
        } else {
            Err(EngineError::UnknownUser(user))
        }
    }
}
