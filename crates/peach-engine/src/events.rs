//! Change notifications for the UI layer.
//!
//! The engine publishes a [`PeachEvent`] after each committed state change.
//! A UI subscribes once and filters with [`PeachEvent::involves`]; it never
//! needs to know how the store persists anything.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use peach_shared::{ChannelId, UserId, UserPair};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeachEvent {
    LikeRecorded {
        actor: UserId,
        target: UserId,
    },
    MatchCreated {
        users: UserPair,
        channel_id: ChannelId,
    },
    MessageSent {
        channel_id: ChannelId,
        message_id: Uuid,
        seq: i64,
        sender: UserId,
    },
    MessagesRead {
        channel_id: ChannelId,
        reader: UserId,
        count: usize,
    },
}

impl PeachEvent {
    /// Whether `user` should hear about this event.
    pub fn involves(&self, user: UserId) -> bool {
        match self {
            PeachEvent::LikeRecorded { actor, target } => *actor == user || *target == user,
            PeachEvent::MatchCreated { users, .. } => users.contains(user),
            PeachEvent::MessageSent { channel_id, .. }
            | PeachEvent::MessagesRead { channel_id, .. } => channel_id
                .participants()
                .map_or(false, |pair| pair.contains(user)),
        }
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        match self {
            PeachEvent::MatchCreated { channel_id, .. }
            | PeachEvent::MessageSent { channel_id, .. }
            | PeachEvent::MessagesRead { channel_id, .. } => Some(channel_id),
            PeachEvent::LikeRecorded { .. } => None,
        }
    }
}

/// Fan-out of [`PeachEvent`]s. Cloning shares the same channel, so several
/// engines (one per connection) can publish to one set of subscribers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<PeachEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PeachEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn publish(&self, event: PeachEvent) {
        match self.tx.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "event published"),
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(?event, "no subscribers for event");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
