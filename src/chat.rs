use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Token counts reported by a chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated for the reply
    pub completion_tokens: u32,
    /// Prompt and reply combined
    pub total_tokens: u32,
}

/// Who sent a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The human side of the exchange
    User,
    /// The model side of the exchange
    Assistant,
}

impl ChatRole {
    /// The role name chat endpoints expect on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Who sent the message
    pub role: ChatRole,
    /// The text of the message
    pub content: String,
}

impl ChatMessage {
    /// Starts building a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Starts building an assistant message
    pub fn assistant() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Assistant)
    }
}

/// Builder for [`ChatMessage`].
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    content: String,
}

impl ChatMessageBuilder {
    /// Starts a builder for the given role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            content: String::new(),
        }
    }

    /// Sets the message text
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Builds the message
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
        }
    }
}

/// A reply returned by a chat backend.
///
/// Replies stay behind a trait so callers treat every backend the same
/// way; extraction only ever sees the text.
pub trait ChatResponse: fmt::Debug + fmt::Display {
    /// The text of the reply, if the endpoint returned any.
    fn text(&self) -> Option<String>;
    /// Token usage reported by the endpoint, if available.
    fn usage(&self) -> Option<Usage> {
        None
    }
}

/// Trait for backends that support chat-style interactions.
#[async_trait]
pub trait ChatProvider: Sync + Send + fmt::Debug {
    /// Sends the conversation so far and returns the model's reply.
    ///
    /// Messages are ordered oldest first. Backends prepend their configured
    /// system prompt, when set, before sending.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatError>;
}
