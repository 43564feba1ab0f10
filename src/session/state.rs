//! Session state types and guarded transitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Interaction strategy sent to the remote service with each chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    #[default]
    Auto,
    Qa,
    Summarize,
    Ppt,
}

impl AgentMode {
    /// Wire name, matching the `agent_type` field of the chat request
    pub fn as_str(self) -> &'static str {
        match self {
            AgentMode::Auto => "auto",
            AgentMode::Qa => "qa",
            AgentMode::Summarize => "summarize",
            AgentMode::Ppt => "ppt",
        }
    }

    pub const ALL: [AgentMode; 4] = [
        AgentMode::Auto,
        AgentMode::Qa,
        AgentMode::Summarize,
        AgentMode::Ppt,
    ];
}

impl std::str::FromStr for AgentMode {
    type Err = UnknownAgentMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(AgentMode::Auto),
            "qa" => Ok(AgentMode::Qa),
            "summarize" => Ok(AgentMode::Summarize),
            "ppt" => Ok(AgentMode::Ppt),
            _ => Err(UnknownAgentMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown agent mode: {0} (expected auto, qa, summarize or ppt)")]
pub struct UnknownAgentMode(pub String);

/// Observable session phase
///
/// `Busy` is `Ready` with a chat exchange outstanding, not a separate
/// document-state: a busy session always has a document attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No document uploaded yet (initial, and after reset)
    Empty,
    /// Document attached, no exchange in flight
    Ready,
    /// Document attached, one exchange in flight
    Busy,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Empty => "empty",
            SessionStatus::Ready => "ready",
            SessionStatus::Busy => "busy",
        };
        f.write_str(s)
    }
}

/// The uploaded document the session is bound to
///
/// `server_metadata` preserves whatever extra fields the upload response
/// carried (chunk counts, extracted text length) without interpreting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
    #[serde(flatten)]
    pub server_metadata: Map<String, Value>,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            server_metadata: Map::new(),
        }
    }
}

/// Illegal state-machine call. These are programmer errors: callers are
/// expected to consult `status()` first, so this propagates rather than
/// being swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid transition: {action} while session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },
}

/// One document-chat session: Empty → Ready (upload) → Empty (reset),
/// with an orthogonal busy flag layered on Ready.
///
/// Invariants upheld by the guarded methods:
/// - a document is attached iff the status is not `Empty`
/// - the busy flag is only set while a document is attached
#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    agent_mode: AgentMode,
    exchange_in_flight: bool,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter identifying the current session instance. Bumped
    /// by `complete_upload` and `reset`, so an in-flight exchange can tell
    /// whether the session it started under still exists.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> SessionStatus {
        match (&self.document, self.exchange_in_flight) {
            (None, _) => SessionStatus::Empty,
            (Some(_), false) => SessionStatus::Ready,
            (Some(_), true) => SessionStatus::Busy,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn agent_mode(&self) -> AgentMode {
        self.agent_mode
    }

    pub fn is_busy(&self) -> bool {
        self.exchange_in_flight
    }

    /// Guard for starting an upload. Changes nothing; the transition happens
    /// in `complete_upload` once the result is known.
    pub fn begin_upload(&self) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Empty => Ok(()),
            status => Err(SessionError::InvalidTransition {
                action: "begin_upload",
                status,
            }),
        }
    }

    /// Empty → Ready. Stores the document and resets the agent mode to auto.
    pub fn complete_upload(&mut self, document: Document) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Empty => {
                self.document = Some(document);
                self.agent_mode = AgentMode::Auto;
                self.generation += 1;
                Ok(())
            }
            status => Err(SessionError::InvalidTransition {
                action: "complete_upload",
                status,
            }),
        }
    }

    /// Allowed in Ready, busy or not. Idempotent.
    pub fn select_agent_mode(&mut self, mode: AgentMode) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Empty => Err(SessionError::InvalidTransition {
                action: "select_agent_mode",
                status: SessionStatus::Empty,
            }),
            _ => {
                self.agent_mode = mode;
                Ok(())
            }
        }
    }

    /// Sets the busy flag. Fails in Empty (chat is unreachable without a
    /// document) and when an exchange is already outstanding.
    pub fn begin_exchange(&mut self) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Ready => {
                self.exchange_in_flight = true;
                Ok(())
            }
            status => Err(SessionError::InvalidTransition {
                action: "begin_exchange",
                status,
            }),
        }
    }

    /// Clears the busy flag unconditionally, on success and failure alike,
    /// so a failed exchange can never leave the session stuck busy.
    pub fn finish_exchange(&mut self) {
        self.exchange_in_flight = false;
    }

    /// Ready (busy or not) → Empty. Discards the document, clears the busy
    /// flag and restores the default agent mode.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Empty => Err(SessionError::InvalidTransition {
                action: "reset",
                status: SessionStatus::Empty,
            }),
            _ => {
                self.document = None;
                self.agent_mode = AgentMode::Auto;
                self.exchange_in_flight = false;
                self.generation += 1;
                Ok(())
            }
        }
    }
}
