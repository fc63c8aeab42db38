#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Simulated multi-turn conversations against a remote bot.
//!
//! A [`SimulationEngine`] owns one remote session and its transcript. It
//! opens the session, sends a seed message, then alternates between asking
//! the [`Synthesizer`] for the next user line and sending it to the bot,
//! for a bounded number of turns. [`Simulator`] wraps the engine for
//! callers that speak the external request/report shapes.
//!
//! # Key Features
//! - Strictly sequential turn loop, one engine per conversation
//! - Narrow anti-duplicate guard on recorded exchanges
//! - Synthesis failures fall back to a fixed reply instead of aborting
//! - Partial transcripts are reported even when a run fails

mod engine;
mod facade;
mod session;
mod synthesizer;
mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{RunSummary, SimulationEngine, SimulationError};
pub use facade::{
    DEFAULT_MAX_TURNS, DEFAULT_USER_PROMPT, HistoryEntry, HistoryError, SimulationReport,
    SimulationRequest, Simulator, parse_history,
};
pub use session::{ConversationSession, SessionState};
pub use synthesizer::{
    DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY, Synthesized, Synthesizer, SynthesizerConfig,
};
pub use transcript::{Speaker, Transcript, Turn};
