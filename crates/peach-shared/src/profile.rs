//! Profile records.
//!
//! The matching attributes live in optional groups (`basics`,
//! `relationships`, `life`). A missing group is equivalent to an empty one:
//! it contributes nothing to the compatibility score and is never an error.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quota::QuotaState;
use crate::types::UserId;

/// Interests shown on the "Basics" card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Basics {
    /// Interest tags ("Playing Ludo", "Swimming", ...).
    pub fun: BTreeSet<String>,
    /// Music and movie tags.
    pub media: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Life {
    /// Home location tag, e.g. "Warri".
    pub based: Option<String>,
    pub upbringing: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Work {
    pub job: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Relationships {
    pub values: BTreeSet<String>,
    pub looking_for: Option<String>,
}

/// A user profile as stored and matched on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    /// Public display alias. Must not be blank.
    pub alias: String,
    /// Study level ("Year 2", "Intern", ...).
    pub level: Option<String>,
    pub basics: Option<Basics>,
    pub life: Option<Life>,
    pub work: Option<Work>,
    pub relationships: Option<Relationships>,
    pub vision: Option<String>,
    pub special: Option<String>,
    pub onboarding_complete: bool,
    pub premium: bool,
    /// Premium expiry. `None` with `premium == true` never expires.
    pub premium_until: Option<DateTime<Utc>>,
    pub banned: bool,
    pub quota: QuotaState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh, free-tier profile with no attribute groups filled in.
    pub fn new(id: UserId, alias: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            alias: alias.into(),
            level: None,
            basics: None,
            life: None,
            work: None,
            relationships: None,
            vision: None,
            special: None,
            onboarding_complete: false,
            premium: false,
            premium_until: None,
            banned: false,
            quota: QuotaState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the premium subscription is in effect at `now`.
    pub fn is_premium_at(&self, now: DateTime<Utc>) -> bool {
        self.premium && self.premium_until.map_or(true, |until| now < until)
    }

    pub fn fun(&self) -> Option<&BTreeSet<String>> {
        self.basics.as_ref().map(|b| &b.fun)
    }

    pub fn media(&self) -> Option<&BTreeSet<String>> {
        self.basics.as_ref().map(|b| &b.media)
    }

    pub fn values(&self) -> Option<&BTreeSet<String>> {
        self.relationships.as_ref().map(|r| &r.values)
    }

    pub fn based(&self) -> Option<&str> {
        self.life.as_ref().and_then(|l| l.based.as_deref())
    }

    pub fn looking_for(&self) -> Option<&str> {
        self.relationships
            .as_ref()
            .and_then(|r| r.looking_for.as_deref())
    }
}
