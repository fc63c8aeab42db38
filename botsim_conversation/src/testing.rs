//! Scripted collaborators for engine and facade tests.

use async_trait::async_trait;
use botsim_core::{
    BotReply, BotSession, ChatMessage, CompletionParams, LLMProvider, LLMResponse, RemoteError,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays canned completions; errors once the script runs out.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
    params: Mutex<Option<CompletionParams>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            params: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<CompletionParams> {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> anyhow::Result<LLMResponse> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        *self.params.lock().unwrap() = Some(params.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                usage: None,
            }),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }
}

/// Bot that answers from a fixed script and records what it was sent.
pub struct ScriptedBot {
    init_ok: bool,
    replies: Mutex<VecDeque<Result<BotReply, RemoteError>>>,
    sent: Mutex<Vec<String>>,
    initialized: Mutex<Vec<(String, i64)>>,
}

impl ScriptedBot {
    pub fn new(replies: Vec<Result<BotReply, RemoteError>>) -> Self {
        Self {
            init_ok: true,
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
            initialized: Mutex::new(Vec::new()),
        }
    }

    /// Bot that answers every message with `Message(text)` in order.
    pub fn answering(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(BotReply::Message((*t).to_string())))
                .collect(),
        )
    }

    pub fn rejecting_init() -> Self {
        Self {
            init_ok: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn initialized(&self) -> Vec<(String, i64)> {
        self.initialized.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotSession for ScriptedBot {
    async fn initialize(&self, conversation_id: &str, bot_id: i64) -> Result<(), RemoteError> {
        self.initialized
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), bot_id));
        if self.init_ok {
            Ok(())
        } else {
            Err(RemoteError::Rejected("status 1".to_string()))
        }
    }

    async fn exchange(
        &self,
        _conversation_id: &str,
        message: &str,
    ) -> Result<BotReply, RemoteError> {
        self.sent.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RemoteError::Transport("connection refused".to_string())))
    }
}
