use serde::Serialize;
use uuid::Uuid;

use peach_shared::{Allowance, UserId};
use peach_store::{LikeOutcome, Match, Notification};

use super::MatchEngine;
use crate::error::{EngineError, Result};
use crate::events::PeachEvent;

/// What the UI needs after a swipe right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RipenResult {
    pub outcome: LikeOutcome,
    /// Set when this like completed a mutual pair.
    pub matched: Option<Match>,
}

impl MatchEngine {
    /// Like `target` and, if they already liked `actor`, create the match and
    /// its channel. Both happen in one transaction.
    pub fn ripen(&self, actor: UserId, target: UserId) -> Result<RipenResult> {
        self.check_like_args(actor, target)?;

        let ripen = self.db.ripen(
            actor,
            target,
            self.clock.today(),
            self.clock.now(),
            &self.policy,
        )?;

        self.after_like(actor, target, ripen.outcome);
        let matched = ripen.matched.map(|detected| {
            if detected.created {
                self.notifier.publish(PeachEvent::MatchCreated {
                    users: detected.record.users,
                    channel_id: detected.record.channel_id.clone(),
                });
            }
            detected.record
        });

        Ok(RipenResult {
            outcome: ripen.outcome,
            matched,
        })
    }

    /// Record a like without looking for the reverse one.
    pub fn record_like(&self, actor: UserId, target: UserId) -> Result<LikeOutcome> {
        self.check_like_args(actor, target)?;

        let outcome = self.db.record_like(
            actor,
            target,
            self.clock.today(),
            self.clock.now(),
            &self.policy,
        )?;
        self.after_like(actor, target, outcome);
        Ok(outcome)
    }

    /// After a recorded like: return the match if `target` had already liked
    /// `actor`, creating it (and its channel) on first detection.
    pub fn detect_mutual(&self, actor: UserId, target: UserId) -> Result<Option<Match>> {
        if actor == target {
            return Err(EngineError::InvalidArgument("a user cannot match themselves".into()));
        }

        let detected = self.db.detect_mutual(actor, target, self.clock.now())?;
        Ok(detected.map(|detected| {
            if detected.created {
                self.notifier.publish(PeachEvent::MatchCreated {
                    users: detected.record.users,
                    channel_id: detected.record.channel_id.clone(),
                });
            }
            detected.record
        }))
    }

    /// Today's remaining likes for `user`.
    pub fn quota(&self, user: UserId) -> Result<Allowance> {
        let profile = self.profile(user)?;
        let premium = profile.is_premium_at(self.clock.now());
        Ok(self
            .policy
            .check(&profile.quota, premium, self.clock.today()))
    }

    /// Every match of `user`, newest first.
    pub fn matches(&self, user: UserId) -> Result<Vec<Match>> {
        self.profile(user)?;
        Ok(self.db.list_matches(user)?)
    }

    /// Match notifications for `user`, newest first.
    pub fn notifications(&self, user: UserId) -> Result<Vec<Notification>> {
        self.profile(user)?;
        Ok(self.db.list_notifications(user)?)
    }

    /// Returns `false` if it was already read or does not exist.
    pub fn mark_notification_read(&self, id: Uuid) -> Result<bool> {
        Ok(self.db.mark_notification_read(id)?)
    }

    fn check_like_args(&self, actor: UserId, target: UserId) -> Result<()> {
        if actor == target {
            tracing::warn!(actor = %actor, "rejected self-like");
            return Err(EngineError::InvalidArgument("a user cannot like themselves".into()));
        }
        self.active_profile(actor)?;
        self.profile(target)?;
        Ok(())
    }

    fn after_like(&self, actor: UserId, target: UserId, outcome: LikeOutcome) {
        match outcome {
            LikeOutcome::Recorded => {
                tracing::info!(actor = %actor, target = %target, "like recorded");
                self.notifier
                    .publish(PeachEvent::LikeRecorded { actor, target });
            }
            LikeOutcome::AlreadyLiked => {
                tracing::debug!(actor = %actor, target = %target, "already liked");
            }
            LikeOutcome::QuotaExhausted => {
                tracing::warn!(
                    actor = %actor,
                    limit = self.policy.daily_limit,
                    "daily like limit reached"
                );
            }
        }
    }
}
