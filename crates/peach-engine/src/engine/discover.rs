use serde::Serialize;

use peach_shared::{compatibility, Profile, UserId};
use peach_store::DiscoverFilter;

use super::MatchEngine;
use crate::error::Result;

const SEARCH_LIMIT: u32 = 50;

/// A feed candidate with its compatibility score against the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredProfile {
    pub profile: Profile,
    pub score: u32,
}

/// Who ripened the user without being ripened back. Free users only learn
/// how many there are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdmirerView {
    Visible { profiles: Vec<Profile> },
    Hidden { count: u64 },
}

impl AdmirerView {
    pub fn count(&self) -> u64 {
        match self {
            AdmirerView::Visible { profiles } => profiles.len() as u64,
            AdmirerView::Hidden { count } => *count,
        }
    }
}

impl MatchEngine {
    /// The viewer's feed, best match first.
    pub fn discover(&self, viewer: UserId, filter: &DiscoverFilter) -> Result<Vec<ScoredProfile>> {
        let me = self.active_profile(viewer)?;

        let mut feed: Vec<ScoredProfile> = self
            .db
            .list_discoverable_profiles(viewer, filter)?
            .into_iter()
            .map(|profile| ScoredProfile {
                score: compatibility(&me, &profile),
                profile,
            })
            .collect();

        feed.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.profile.alias.cmp(&b.profile.alias))
        });

        tracing::debug!(viewer = %viewer, candidates = feed.len(), "discovery feed built");
        Ok(feed)
    }

    /// Look people up by alias fragment.
    pub fn search(&self, viewer: UserId, query: &str) -> Result<Vec<Profile>> {
        self.active_profile(viewer)?;
        let found = self.db.search_profiles(viewer, query, SEARCH_LIMIT)?;
        tracing::debug!(viewer = %viewer, results = found.len(), "alias search");
        Ok(found)
    }

    pub fn admirers(&self, user: UserId) -> Result<AdmirerView> {
        let profile = self.profile(user)?;

        if profile.is_premium_at(self.clock.now()) {
            Ok(AdmirerView::Visible {
                profiles: self.db.admirers(user)?,
            })
        } else {
            Ok(AdmirerView::Hidden {
                count: self.db.admirer_count(user)?,
            })
        }
    }
}
