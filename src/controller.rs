//! Interaction orchestrator
//!
//! Composes the session state machine, the conversation log and the
//! transport client: validates input, appends turns, gates concurrent
//! sends, and broadcasts change events for rendering layers.

mod orchestrator;

#[cfg(test)]
mod testing;

pub use orchestrator::{ChatController, ControllerError, ResetPolicy, SessionEvent};
