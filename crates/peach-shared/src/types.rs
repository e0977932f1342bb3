use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::CHANNEL_ID_SEPARATOR;
use crate::error::IdError;

// User identity = opaque UUID issued at signup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An unordered pair of distinct users, stored low id first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Result<Self, IdError> {
        if a == b {
            return Err(IdError::SameParticipant);
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The participant that is not `user`, if `user` belongs to the pair.
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        ChannelId(format!("{}{}{}", self.low, CHANNEL_ID_SEPARATOR, self.high))
    }
}

/// Deterministic conversation id: `"<low>_<high>"` over the sorted pair, so
/// either participant derives the same id without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn for_pair(a: UserId, b: UserId) -> Result<Self, IdError> {
        Ok(UserPair::new(a, b)?.channel_id())
    }

    pub fn participants(&self) -> Result<UserPair, IdError> {
        let (a, b) = self
            .0
            .split_once(CHANNEL_ID_SEPARATOR)
            .ok_or_else(|| IdError::MalformedChannelId(self.0.clone()))?;
        let pair = UserPair::new(a.parse()?, b.parse()?)?;
        if pair.channel_id() != *self {
            // "b_a" is never a valid id for the pair {a, b}
            return Err(IdError::MalformedChannelId(self.0.clone()));
        }
        Ok(pair)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.to_string());
        id.participants()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_is_order_independent() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(
            ChannelId::for_pair(a, b).unwrap(),
            ChannelId::for_pair(b, a).unwrap()
        );
    }

    #[test]
    fn channel_id_rejects_self_pair() {
        let a = UserId::new();
        assert!(matches!(
            ChannelId::for_pair(a, a),
            Err(IdError::SameParticipant)
        ));
    }

    #[test]
    fn channel_id_parses_back_to_its_pair() {
        let a = UserId::new();
        let b = UserId::new();
        let id = ChannelId::for_pair(a, b).unwrap();

        let parsed: ChannelId = id.as_str().parse().unwrap();
        let pair = parsed.participants().unwrap();
        assert!(pair.contains(a));
        assert!(pair.contains(b));
        assert_eq!(pair.other(a), Some(b));
    }

    #[test]
    fn channel_id_rejects_unsorted_text() {
        let pair = UserPair::new(UserId::new(), UserId::new()).unwrap();
        let reversed = format!("{}_{}", pair.high(), pair.low());
        assert!(reversed.parse::<ChannelId>().is_err());
        assert!("not-a-channel".parse::<ChannelId>().is_err());
    }
}
