//! Channel trait and the message types that cross it.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::dialogs::Activity;
use crate::error::ChannelError;

/// Stream of user messages produced by a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A user message arriving on a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel that produced the message.
    pub channel: String,
    pub user_id: String,
    /// Conversation the message belongs to. Defaults to `{channel}:{user_id}`.
    pub conversation_id: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            conversation_id: format!("{channel}:{user_id}"),
            content: content.to_string(),
            received_at: Utc::now(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }
}

/// One bot reply to send back on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
    /// Quick replies to offer alongside the text.
    pub suggested_actions: Vec<String>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            suggested_actions: Vec::new(),
        }
    }
}

impl From<Activity> for OutgoingResponse {
    fn from(activity: Activity) -> Self {
        match activity {
            Activity::Text { text } => Self::text(text),
            Activity::SuggestedActions { text, actions } => Self {
                content: text,
                suggested_actions: actions,
            },
        }
    }
}

/// A surface the bot talks to users through.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Begin receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send one reply for `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}
