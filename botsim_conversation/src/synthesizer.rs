//! Generates the simulated user's next line.

use botsim_core::{ChatMessage, CompletionParams, LLMProvider, Role};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::transcript::{Speaker, Transcript};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates the next user message in a conversation.
The user is learning English from a bot. Generate a natural, brief response that continues the conversation.
Your response should be in Vietnamese and should be a single message without any explanation or additional text.";

pub const FALLBACK_REPLY: &str = "Tôi không hiểu. Bạn có thể giải thích rõ hơn không?";

#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub params: CompletionParams,
    pub system_prompt: String,
    pub fallback: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            params: CompletionParams::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback: FALLBACK_REPLY.to_string(),
        }
    }
}

impl SynthesizerConfig {
    #[must_use]
    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }
}

/// Outcome of a synthesis call. Both variants carry usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesized {
    Generated(String),
    Fallback(String),
}

impl Synthesized {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

pub struct Synthesizer<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    config: SynthesizerConfig,
}

impl<P> Synthesizer<P>
where
    P: LLMProvider + Send + Sync,
{
    pub const fn new(provider: P, config: SynthesizerConfig) -> Self {
        Self { provider, config }
    }

    /// Build the prompt: instruction, role-mapped transcript, and the
    /// latest bot reply when the transcript did not record it.
    #[must_use]
    pub fn build_messages(&self, transcript: &Transcript, latest_reply: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(ChatMessage::new(Role::System, self.config.system_prompt.clone()));
        messages.extend(transcript.to_chat_messages());

        let recorded = transcript
            .last()
            .is_some_and(|t| t.speaker == Speaker::Responder && t.text == latest_reply);
        if !recorded && !latest_reply.is_empty() {
            messages.push(ChatMessage::new(Role::Assistant, latest_reply));
        }

        messages
    }

    /// Produce the next requester line. Never fails; provider errors and
    /// empty completions yield the configured fallback.
    pub async fn synthesize(&self, transcript: &Transcript, latest_reply: &str) -> Synthesized {
        let messages = self.build_messages(transcript, latest_reply);

        let started = Instant::now();
        match self.provider.chat(&messages, &self.config.params).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    warn!("Generative provider returned an empty completion, using fallback");
                    return Synthesized::Fallback(self.config.fallback.clone());
                }
                info!(
                    "Generated in {:.2} seconds: {text}",
                    started.elapsed().as_secs_f64()
                );
                Synthesized::Generated(text.to_string())
            }
            Err(e) => {
                warn!("Error generating user response: {e}");
                Synthesized::Fallback(self.config.fallback.clone())
            }
        }
    }
}
