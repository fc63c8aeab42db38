//! External request and report shapes, and the entry point shared by the
//! CLI and the HTTP service.

use botsim_core::{BotSession, LLMProvider};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::engine::SimulationEngine;
use crate::synthesizer::{Synthesizer, SynthesizerConfig};
use crate::transcript::{Speaker, Turn};

pub const DEFAULT_USER_PROMPT: &str = "sẵn sàng";
pub const DEFAULT_MAX_TURNS: i64 = 3;
const DEFAULT_BOT_ID: i64 = 16;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid history JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("history must be a JSON array")]
    NotAnArray,

    #[error("history entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: &'static str },
}

/// Body of a simulation request. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default = "SimulationRequest::default_bot_id")]
    pub bot_id: i64,
    #[serde(default = "SimulationRequest::default_user_prompt")]
    pub user_prompt: String,
    #[serde(default = "SimulationRequest::default_max_turns")]
    pub max_turns: i64,
    /// JSON-encoded array of `{role, content}`.
    #[serde(default = "SimulationRequest::default_history")]
    pub history: String,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            bot_id: Self::default_bot_id(),
            user_prompt: Self::default_user_prompt(),
            max_turns: Self::default_max_turns(),
            history: Self::default_history(),
        }
    }
}

impl SimulationRequest {
    const fn default_bot_id() -> i64 {
        DEFAULT_BOT_ID
    }

    fn default_user_prompt() -> String {
        DEFAULT_USER_PROMPT.to_string()
    }

    const fn default_max_turns() -> i64 {
        DEFAULT_MAX_TURNS
    }

    fn default_history() -> String {
        "[]".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub success: bool,
    /// Transcript with external role labels (`user`/`assistant`).
    pub conversation_history: Vec<HistoryEntry>,
    /// Transcript with display labels (`User`/`Bot`).
    #[serde(default)]
    pub simulation_conversation: Vec<HistoryEntry>,
    pub error: Option<String>,
}

impl SimulationReport {
    fn from_turns(turns: &[Turn], success: bool, error: Option<String>) -> Self {
        let project = |label: fn(Speaker) -> &'static str| -> Vec<HistoryEntry> {
            turns
                .iter()
                .map(|turn| HistoryEntry {
                    role: label(turn.speaker).to_string(),
                    content: turn.text.clone(),
                })
                .collect()
        };

        Self {
            success,
            conversation_history: project(Speaker::external_label),
            simulation_conversation: project(Speaker::display_label),
            error,
        }
    }
}

/// Decode a JSON-encoded history string into turns.
pub fn parse_history(raw: &str) -> Result<Vec<Turn>, HistoryError> {
    let value: Value = serde_json::from_str(raw)?;
    turns_from_value(value)
}

fn turns_from_value(value: Value) -> Result<Vec<Turn>, HistoryError> {
    let Value::Array(entries) = value else {
        return Err(HistoryError::NotAnArray);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let role = entry
                .get("role")
                .and_then(Value::as_str)
                .ok_or(HistoryError::InvalidEntry {
                    index,
                    reason: "missing string field \"role\"",
                })?;
            let content = entry
                .get("content")
                .and_then(Value::as_str)
                .ok_or(HistoryError::InvalidEntry {
                    index,
                    reason: "missing string field \"content\"",
                })?;
            Ok(Turn {
                speaker: Speaker::from_external(role),
                text: content.to_string(),
            })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "simulation panicked".to_string())
}

/// Builds an engine per request from shared, immutable collaborators.
#[derive(Clone)]
pub struct Simulator {
    bot: Arc<dyn BotSession>,
    provider: Arc<dyn LLMProvider>,
    synthesis: SynthesizerConfig,
}

impl Simulator {
    pub fn new(
        bot: Arc<dyn BotSession>,
        provider: Arc<dyn LLMProvider>,
        synthesis: SynthesizerConfig,
    ) -> Self {
        Self {
            bot,
            provider,
            synthesis,
        }
    }

    #[must_use]
    pub fn engine(&self, bot_id: i64) -> SimulationEngine {
        SimulationEngine::new(
            self.bot.clone(),
            Synthesizer::new(self.provider.clone(), self.synthesis.clone()),
            bot_id,
        )
    }

    /// Run one simulation and report its transcript.
    ///
    /// Only a history string that is not valid JSON is returned as an
    /// error, before any engine exists. Every other outcome, including a
    /// panic inside the run, becomes a report carrying whatever transcript
    /// was accumulated.
    pub async fn run(&self, request: SimulationRequest) -> Result<SimulationReport, HistoryError> {
        let history = match parse_history(&request.history) {
            Err(HistoryError::InvalidJson(e)) => return Err(HistoryError::InvalidJson(e)),
            other => other,
        };
        let max_turns = usize::try_from(request.max_turns).unwrap_or(0);

        let mut slot: Option<SimulationEngine> = None;
        let outcome = AssertUnwindSafe(async {
            let seeded = history?;
            let engine = slot.insert(self.engine(request.bot_id).with_history(seeded));
            Ok::<_, HistoryError>(engine.simulate(&request.user_prompt, max_turns).await)
        })
        .catch_unwind()
        .await;

        let (success, error) = match outcome {
            Ok(Ok(Ok(summary))) => {
                info!(
                    "Simulation completed successfully: {} messages sent, {} fallbacks",
                    summary.messages_sent, summary.fallbacks
                );
                (true, None)
            }
            Ok(Ok(Err(e))) => {
                info!("Simulation failed: {e}");
                (false, Some(e.to_string()))
            }
            Ok(Err(e)) => {
                error!("Error in simulation: {e}");
                (false, Some(e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Simulation panicked: {message}");
                (false, Some(message))
            }
        };

        let turns = slot
            .map(|engine| engine.into_transcript().into_turns())
            .unwrap_or_default();

        Ok(SimulationReport::from_turns(&turns, success, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBot, ScriptedProvider};
    use async_trait::async_trait;
    use botsim_core::{BotReply, RemoteError};

    fn simulator(bot: ScriptedBot, provider: ScriptedProvider) -> (Simulator, Arc<ScriptedBot>) {
        let bot = Arc::new(bot);
        let simulator = Simulator::new(
            bot.clone(),
            Arc::new(provider),
            SynthesizerConfig::default(),
        );
        (simulator, bot)
    }

    fn entry(role: &str, content: &str) -> HistoryEntry {
        HistoryEntry {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn request_defaults_apply_to_empty_body() {
        let request: SimulationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.bot_id, 16);
        assert_eq!(request.user_prompt, "sẵn sàng");
        assert_eq!(request.max_turns, 3);
        assert_eq!(request.history, "[]");
    }

    #[test]
    fn parse_history_maps_roles() {
        let raw = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
        let turns = parse_history(raw).unwrap();
        assert_eq!(turns, vec![Turn::requester("hi"), Turn::responder("hello")]);
    }

    #[test]
    fn parse_history_rejects_bad_input() {
        assert!(matches!(
            parse_history("{not json"),
            Err(HistoryError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_history(r#"{"role":"user"}"#),
            Err(HistoryError::NotAnArray)
        ));
        assert!(matches!(
            parse_history(r#"[{"content":"hi"}]"#),
            Err(HistoryError::InvalidEntry { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn history_round_trips_with_supplied_labels() {
        let (simulator, _) = simulator(
            ScriptedBot::answering(&["Hello!"]),
            ScriptedProvider::new(vec![]),
        );
        let request = SimulationRequest {
            max_turns: 1,
            history: r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#
                .to_string(),
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(report.success);
        assert_eq!(report.error, None);
        assert_eq!(report.conversation_history[0], entry("user", "hi"));
        assert_eq!(report.conversation_history[1], entry("assistant", "hello"));
        assert_eq!(report.conversation_history[3], entry("assistant", "Hello!"));
        assert_eq!(report.simulation_conversation[2], entry("User", "sẵn sàng"));
        assert_eq!(report.simulation_conversation[3], entry("Bot", "Hello!"));
    }

    #[tokio::test]
    async fn seed_matching_seeded_text_two_back_is_not_recorded() {
        let (simulator, bot) = simulator(
            ScriptedBot::answering(&["Hello!"]),
            ScriptedProvider::new(vec![]),
        );
        let request = SimulationRequest {
            user_prompt: "hi".to_string(),
            max_turns: 1,
            history: r#"[{"role":"assistant","content":"hi"},{"role":"user","content":"other"}]"#
                .to_string(),
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(report.success);
        assert_eq!(bot.sent(), vec!["hi"]);
        assert_eq!(
            report.conversation_history,
            vec![entry("assistant", "hi"), entry("user", "other")]
        );
    }

    #[tokio::test]
    async fn negative_turns_send_only_the_seed() {
        let (simulator, bot) = simulator(
            ScriptedBot::answering(&["Hello!"]),
            ScriptedProvider::new(vec![]),
        );
        let request = SimulationRequest {
            max_turns: -1,
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(report.success);
        assert_eq!(bot.sent(), vec!["sẵn sàng"]);
        assert_eq!(report.conversation_history.len(), 2);
    }

    #[tokio::test]
    async fn malformed_history_is_rejected_before_any_exchange() {
        let (simulator, bot) = simulator(
            ScriptedBot::answering(&["Hello!"]),
            ScriptedProvider::new(vec![]),
        );
        let request = SimulationRequest {
            history: "{not json".to_string(),
            ..SimulationRequest::default()
        };

        let err = simulator.run(request).await.unwrap_err();

        assert!(err.to_string().starts_with("Invalid history JSON"));
        assert!(bot.initialized().is_empty());
        assert!(bot.sent().is_empty());
    }

    #[tokio::test]
    async fn misshapen_history_is_reported_as_failure() {
        let (simulator, bot) = simulator(
            ScriptedBot::answering(&["Hello!"]),
            ScriptedProvider::new(vec![]),
        );
        let request = SimulationRequest {
            history: r#"[{"role":"user"}]"#.to_string(),
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(!report.success);
        assert!(report.error.unwrap().contains("content"));
        assert!(report.conversation_history.is_empty());
        assert!(bot.initialized().is_empty());
    }

    #[tokio::test]
    async fn failed_run_still_returns_partial_transcript() {
        let (simulator, _) = simulator(
            ScriptedBot::new(vec![
                Ok(BotReply::Message("Hello!".to_string())),
                Err(RemoteError::Timeout),
            ]),
            ScriptedProvider::new(vec![Ok("Xin chào".to_string())]),
        );

        let report = simulator.run(SimulationRequest::default()).await.unwrap();

        assert!(!report.success);
        assert!(report.error.is_some());
        assert_eq!(
            report.conversation_history,
            vec![entry("user", "sẵn sàng"), entry("assistant", "Hello!")]
        );
    }

    #[tokio::test]
    async fn init_failure_returns_seeded_history_only() {
        let (simulator, bot) =
            simulator(ScriptedBot::rejecting_init(), ScriptedProvider::new(vec![]));
        let request = SimulationRequest {
            history: r#"[{"role":"user","content":"hi"}]"#.to_string(),
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.conversation_history, vec![entry("user", "hi")]);
        assert!(bot.sent().is_empty());
    }

    struct PanickingBot;

    #[async_trait]
    impl BotSession for PanickingBot {
        async fn initialize(&self, _: &str, _: i64) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn exchange(&self, _: &str, _: &str) -> Result<BotReply, RemoteError> {
            panic!("bot exploded");
        }
    }

    #[tokio::test]
    async fn panic_during_run_is_captured() {
        let simulator = Simulator::new(
            Arc::new(PanickingBot),
            Arc::new(ScriptedProvider::new(vec![])),
            SynthesizerConfig::default(),
        );
        let request = SimulationRequest {
            history: r#"[{"role":"user","content":"hi"}]"#.to_string(),
            ..SimulationRequest::default()
        };

        let report = simulator.run(request).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("bot exploded"));
        assert_eq!(report.conversation_history, vec![entry("user", "hi")]);
    }
}
