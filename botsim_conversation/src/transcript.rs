//! Ordered record of the turns exchanged in one simulated conversation.

use botsim_core::{ChatMessage, Role};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// The simulated user.
    Requester,
    /// The remote bot.
    Responder,
}

impl Speaker {
    /// Map an external role label. Only `"user"` denotes the requester.
    #[must_use]
    pub fn from_external(role: &str) -> Self {
        if role == "user" {
            Self::Requester
        } else {
            Self::Responder
        }
    }

    #[must_use]
    pub const fn external_label(self) -> &'static str {
        match self {
            Self::Requester => "user",
            Self::Responder => "assistant",
        }
    }

    /// Human-readable label used in summaries.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Requester => "User",
            Self::Responder => "Bot",
        }
    }

    /// Role in the generative provider's vocabulary.
    #[must_use]
    pub const fn chat_role(self) -> Role {
        match self {
            Self::Requester => Role::User,
            Self::Responder => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn requester(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Requester,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn responder(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Responder,
            text: text.into(),
        }
    }
}

/// Transcript of a conversation.
///
/// Exchanges are appended as requester/responder pairs through
/// [`Transcript::record_exchange`], which refuses a pair whose request
/// repeats the text two positions back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Seed with pre-existing history.
    #[must_use]
    pub const fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Whether `request` equals the text two positions back.
    ///
    /// Only the text is compared. A seeded history may hold a responder
    /// turn in that slot.
    #[must_use]
    pub fn repeats_previous_request(&self, request: &str) -> bool {
        self.turns
            .len()
            .checked_sub(2)
            .is_some_and(|idx| self.turns[idx].text == request)
    }

    /// Append a request/response pair unless the request is a repeat.
    ///
    /// Returns `true` when the pair was appended.
    pub fn record_exchange(&mut self, request: String, response: String) -> bool {
        if self.repeats_previous_request(&request) {
            return false;
        }
        self.turns.push(Turn::requester(request));
        self.turns.push(Turn::responder(response));
        true
    }

    /// Number of requester turns.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::Requester)
            .count()
    }

    #[must_use]
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| ChatMessage::new(turn.speaker.chat_role(), turn.text.clone()))
            .collect()
    }

    /// One line per turn: `"{n}. {User|Bot}: {text}"`, text cut at 100 chars.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        self.turns
            .iter()
            .enumerate()
            .map(|(i, turn)| {
                format!(
                    "{}. {}: {}",
                    i + 1,
                    turn.speaker.display_label(),
                    truncate(&turn.text, 100)
                )
            })
            .collect()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
