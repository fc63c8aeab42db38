//! Seam to the remote conversational bot under test.
//!
//! Implementations absorb every transport fault and report it as a
//! [`RemoteError`]; nothing here is meant to abort a simulation on its own.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Why a remote bot call did not produce a usable result.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("bot rejected request: {0}")]
    Rejected(String),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("bot returned an empty reply")]
    EmptyReply,
}

/// A reply obtained from the remote bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotReply {
    /// First element of a non-empty `text` array. Recorded in the transcript.
    Message(String),
    /// Stringified raw `text` value (empty array, absent or scalar).
    /// Used as synthesis input but never recorded.
    Unstructured(String),
}

impl BotReply {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message(text) | Self::Unstructured(text) => text,
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Message(text) | Self::Unstructured(text) => text,
        }
    }

    #[must_use]
    pub const fn is_recordable(&self) -> bool {
        matches!(self, Self::Message(_))
    }
}

#[async_trait]
pub trait BotSession: Send + Sync {
    /// Open a conversation with the given bot configuration.
    async fn initialize(&self, conversation_id: &str, bot_id: i64) -> Result<(), RemoteError>;

    /// Send one message and return the bot's answer.
    async fn exchange(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<BotReply, RemoteError>;
}

#[async_trait]
impl<T: BotSession + ?Sized> BotSession for Arc<T> {
    async fn initialize(&self, conversation_id: &str, bot_id: i64) -> Result<(), RemoteError> {
        (**self).initialize(conversation_id, bot_id).await
    }

    async fn exchange(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<BotReply, RemoteError> {
        (**self).exchange(conversation_id, message).await
    }
}
