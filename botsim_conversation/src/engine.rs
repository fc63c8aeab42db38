//! Turn-taking engine for one simulated conversation.

use botsim_core::{BotSession, LLMProvider, RemoteError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::session::{ConversationSession, SessionState};
use crate::synthesizer::Synthesizer;
use crate::transcript::{Transcript, Turn};

/// Why a simulation stopped before completing.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("failed to initialize conversation: {0}")]
    InitFailed(#[source] RemoteError),

    #[error("conversation is not active (state: {0:?})")]
    NotActive(SessionState),

    #[error("no bot response in turn {turn}: {source}")]
    NoResponse {
        turn: usize,
        #[source]
        source: RemoteError,
    },
}

/// Statistics of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Requester messages sent, seed included.
    pub messages_sent: usize,
    /// Synthesized turns that used the fallback reply.
    pub fallbacks: usize,
}

/// Drives one conversation with the remote bot.
///
/// Single-use: `init` then `run` (or `simulate` for both). The transcript
/// stays readable after the run regardless of its outcome.
pub struct SimulationEngine<B = Arc<dyn BotSession>, P = Arc<dyn LLMProvider>>
where
    B: Send + Sync,
    P: Send + Sync,
{
    client: B,
    synthesizer: Synthesizer<P>,
    session: ConversationSession,
    transcript: Transcript,
}

impl<B, P> SimulationEngine<B, P>
where
    B: BotSession + Send + Sync,
    P: LLMProvider + Send + Sync,
{
    pub fn new(client: B, synthesizer: Synthesizer<P>, bot_id: i64) -> Self {
        let session = ConversationSession::new(bot_id);
        info!(
            "Creating simulation engine: session={}, bot={bot_id}, created at {}",
            session.id(),
            session.created_at().to_rfc3339()
        );
        Self {
            client,
            synthesizer,
            session,
            transcript: Transcript::new(),
        }
    }

    /// Seed the transcript with prior history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.transcript = Transcript::from_turns(history);
        self
    }

    #[must_use]
    pub const fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// Open the remote session. No retries.
    pub async fn init(&mut self) -> Result<(), SimulationError> {
        info!(
            "Initializing conversation {} with bot {}",
            self.session.id(),
            self.session.bot_id()
        );

        match self
            .client
            .initialize(self.session.id(), self.session.bot_id())
            .await
        {
            Ok(()) => {
                self.session.activate();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to initialize conversation: {e}");
                self.session.fail();
                Err(SimulationError::InitFailed(e))
            }
        }
    }

    /// Send the seed message, then `max_turns - 1` synthesized messages.
    ///
    /// Stops at the first exchange without a bot response; turns recorded
    /// up to that point stay in the transcript.
    pub async fn run(
        &mut self,
        initial_text: &str,
        max_turns: usize,
    ) -> Result<RunSummary, SimulationError> {
        if self.session.state() != SessionState::Active {
            let state = self.session.state();
            self.session.fail();
            return Err(SimulationError::NotActive(state));
        }

        let max_turns = max_turns.max(1);
        info!("Starting simulation: initial message={initial_text:?}, turns={max_turns}");

        let mut latest_reply = self.exchange_or_fail(initial_text.to_string(), 0).await?;
        let mut fallbacks = 0;

        for turn in 1..max_turns {
            info!("Turn {turn}/{}", max_turns - 1);

            let next = self
                .synthesizer
                .synthesize(&self.transcript, &latest_reply)
                .await;
            if next.is_fallback() {
                fallbacks += 1;
            }

            latest_reply = self.exchange_or_fail(next.into_text(), turn).await?;
        }

        self.session.complete();
        self.log_summary();

        Ok(RunSummary {
            messages_sent: max_turns,
            fallbacks,
        })
    }

    /// `init` followed by `run`.
    pub async fn simulate(
        &mut self,
        initial_text: &str,
        max_turns: usize,
    ) -> Result<RunSummary, SimulationError> {
        self.init().await?;
        self.run(initial_text, max_turns).await
    }

    async fn exchange_or_fail(
        &mut self,
        message: String,
        turn: usize,
    ) -> Result<String, SimulationError> {
        match self.exchange(message).await {
            Ok(reply) => Ok(reply),
            Err(source) => {
                warn!("Failed to get bot response in turn {turn}: {source}");
                self.session.fail();
                Err(SimulationError::NoResponse { turn, source })
            }
        }
    }

    /// Send one message and record the pair when the reply is structured.
    async fn exchange(&mut self, message: String) -> Result<String, RemoteError> {
        let reply = self.client.exchange(self.session.id(), &message).await?;

        if reply.is_recordable() {
            let recorded = self
                .transcript
                .record_exchange(message, reply.text().to_string());
            if !recorded {
                debug!("Skipped repeated exchange in session {}", self.session.id());
            }
        }

        Ok(reply.into_text())
    }

    fn log_summary(&self) {
        info!(
            "Simulation completed: {} messages in transcript, {} from the user",
            self.transcript.len(),
            self.transcript.request_count()
        );
        for line in self.transcript.summary_lines() {
            info!("{line}");
        }
    }
}
