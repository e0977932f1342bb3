use serde::Serialize;

use peach_shared::{ChannelId, UserId};
use peach_store::{Channel, Message, StoreError};

use super::MatchEngine;
use crate::error::{EngineError, Result};
use crate::events::PeachEvent;

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub channel: Channel,
    /// The participant who is not the viewer.
    pub partner: UserId,
    pub unread: u64,
}

impl MatchEngine {
    /// The shared channel id for `a` and `b`, creating the channel if needed.
    pub fn get_or_create_channel(&self, a: UserId, b: UserId) -> Result<ChannelId> {
        if a == b {
            return Err(EngineError::InvalidArgument(
                "a channel needs two distinct users".into(),
            ));
        }
        self.profile(a)?;
        self.profile(b)?;

        let channel = self.db.get_or_create_channel(a, b, self.clock.now())?;
        Ok(channel.id)
    }

    pub fn send_message(
        &self,
        channel_id: &ChannelId,
        sender: UserId,
        content: &str,
    ) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(EngineError::InvalidArgument("message content is empty".into()));
        }
        self.active_profile(sender)?;
        self.participant_check(channel_id, sender)?;

        let message = self
            .db
            .send_message(channel_id, sender, content, self.clock.now())
            .map_err(|e| self.channel_error(channel_id, e))?;

        tracing::debug!(channel = %channel_id, sender = %sender, seq = message.seq, "message sent");
        self.notifier.publish(PeachEvent::MessageSent {
            channel_id: channel_id.clone(),
            message_id: message.id,
            seq: message.seq,
            sender,
        });
        Ok(message)
    }

    /// Mark everything the other participant sent as read. Returns how many
    /// messages changed state.
    pub fn mark_read(&self, channel_id: &ChannelId, reader: UserId) -> Result<usize> {
        self.participant_check(channel_id, reader)?;
        self.db
            .get_channel(channel_id)
            .map_err(|e| self.channel_error(channel_id, e))?;

        let count = self.db.mark_read(channel_id, reader)?;
        if count > 0 {
            self.notifier.publish(PeachEvent::MessagesRead {
                channel_id: channel_id.clone(),
                reader,
                count,
            });
        }
        Ok(count)
    }

    /// All messages, oldest first.
    pub fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>> {
        self.db
            .get_channel(channel_id)
            .map_err(|e| self.channel_error(channel_id, e))?;
        Ok(self.db.list_messages(channel_id)?)
    }

    /// Messages after the polling cursor `after_seq`, oldest first.
    pub fn messages_after(
        &self,
        channel_id: &ChannelId,
        after_seq: i64,
        limit: u32,
    ) -> Result<Vec<Message>> {
        self.db
            .get_channel(channel_id)
            .map_err(|e| self.channel_error(channel_id, e))?;
        Ok(self.db.list_messages_after(channel_id, after_seq, limit)?)
    }

    /// The user's conversations, most recently active first.
    pub fn conversations(&self, user: UserId) -> Result<Vec<Conversation>> {
        self.profile(user)?;

        let mut conversations = Vec::new();
        for channel in self.db.list_channels_for_user(user)? {
            let Some(partner) = channel.participants.other(user) else {
                continue;
            };
            let unread = self.db.unread_count(&channel.id, user)?;
            conversations.push(Conversation {
                channel,
                partner,
                unread,
            });
        }
        Ok(conversations)
    }

    fn participant_check(&self, channel_id: &ChannelId, user: UserId) -> Result<()> {
        if channel_id.participants()?.contains(user) {
            Ok(())
        } else {
            Err(EngineError::InvalidArgument(format!(
                "{user} is not a participant of {channel_id}"
            )))
        }
    }

    fn channel_error(&self, channel_id: &ChannelId, e: StoreError) -> EngineError {
        match e {
            StoreError::NotFound => EngineError::UnknownChannel(channel_id.clone()),
            other => other.into(),
        }
    }
}
