//! Session lifecycle state machine
//!
//! Single source of truth for the document-chat session: which document is
//! attached, which agent mode is selected, and whether a chat exchange is
//! outstanding. All transitions are pure in-memory mutations; I/O lives in
//! the transport client and is sequenced by the controller.

mod state;

#[cfg(test)]
mod proptests;

pub use state::{AgentMode, Document, Session, SessionError, SessionStatus, UnknownAgentMode};
