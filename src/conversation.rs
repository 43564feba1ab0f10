//! Append-only conversation log
//!
//! Turns are immutable once appended and ordered by insertion; the ordinal
//! assigned at append time doubles as a stable rendering key. The only way
//! to remove turns is `clear()`, which the controller invokes on reset.

use serde::Serialize;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One message unit in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    /// Position in the log at append time; contiguous from 0 between clears
    pub ordinal: usize,
    pub role: Role,
    pub text: String,
    /// Opaque URL to a generated file, offered for download as-is
    pub attachment: Option<String>,
    /// Which remote agent produced the reply, when the service says
    pub produced_by_agent: Option<String>,
    /// RFC 3339 wall-clock time of the append
    pub timestamp: String,
}

/// Time-ordered sequence of turns, scoped to one session
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a user turn. Always succeeds; returns the stored turn.
    pub fn append_user(&mut self, text: impl Into<String>) -> &Turn {
        self.push(Role::User, text.into(), None, None)
    }

    /// Append a bot turn with the normalized reply fields.
    pub fn append_bot(
        &mut self,
        text: impl Into<String>,
        attachment: Option<String>,
        produced_by_agent: Option<String>,
    ) -> &Turn {
        self.push(Role::Bot, text.into(), attachment, produced_by_agent)
    }

    /// Empty the log. Only the controller calls this, on session reset.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(
        &mut self,
        role: Role,
        text: String,
        attachment: Option<String>,
        produced_by_agent: Option<String>,
    ) -> &Turn {
        let turn = Turn {
            ordinal: self.turns.len(),
            role,
            text,
            attachment,
            produced_by_agent,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.turns.push(turn);
        self.turns.last().expect("push cannot leave the log empty")
    }
}
