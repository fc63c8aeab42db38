//! Identity and lifecycle of one remote conversation.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_SESSION_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp of `now`, bumped past the last issued value so
/// that every id handed out by this process is distinct.
fn next_session_millis(now: DateTime<Utc>) -> i64 {
    let candidate = now.timestamp_millis();
    let mut last = LAST_SESSION_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = candidate.max(last + 1);
        match LAST_SESSION_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Completed,
    Failed,
}

impl SessionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    bot_id: i64,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl ConversationSession {
    #[must_use]
    pub fn new(bot_id: i64) -> Self {
        let created_at = Utc::now();
        Self {
            id: next_session_millis(created_at).to_string(),
            bot_id,
            state: SessionState::Uninitialized,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn bot_id(&self) -> i64 {
        self.bot_id
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn activate(&mut self) {
        if self.state == SessionState::Uninitialized {
            self.state = SessionState::Active;
        }
    }

    pub(crate) fn complete(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Completed;
        }
    }

    /// Absorbing failure, reachable from any non-terminal state.
    pub(crate) fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Failed;
        }
    }
}
