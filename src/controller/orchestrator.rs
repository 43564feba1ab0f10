//! Session controller driving the chat service

use crate::client::{ChatService, TransportError};
use crate::conversation::{ConversationLog, Turn};
use crate::session::{AgentMode, Document, Session, SessionError, SessionStatus};
use thiserror::Error;
use tokio::sync::broadcast;

/// What to do with local state when the remote reset fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Keep the document and log so the user can retry; surface the failure
    #[default]
    RemoteFirst,
    /// Clear local state even when the remote reset fails
    LocalFallback,
}

/// Change notification for rendering layers. Re-render on any of these.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    TurnAppended { ordinal: usize },
    StatusChanged { status: SessionStatus },
    ExchangeFailed { message: String },
}

#[derive(Debug, Error)]
pub enum ControllerError {
    /// Trimmed input was empty; nothing was sent or appended
    #[error("message is empty")]
    EmptyMessage,

    /// A chat exchange is already outstanding; the send was rejected, not queued
    #[error("a chat exchange is already in flight")]
    ExchangeInFlight,

    /// Operation called in the wrong session phase
    #[error("cannot {action} while session is {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },

    /// Filename does not look like a PDF; the service would reject it
    #[error("unsupported document: {0} (only PDF files are accepted)")]
    UnsupportedDocument(String),

    /// Remote reset failed and the policy keeps local state for retry
    #[error("remote reset failed; session kept so it can be retried")]
    RemoteResetFailed(#[source] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct ControllerState {
    session: Session,
    log: ConversationLog,
}

/// Orchestrates one document-chat session over a `ChatService`.
///
/// State lives behind a `std::sync::Mutex` locked only between suspension
/// points, never across an await, so a second caller can observe the busy
/// flag while an exchange is in flight. Logical mutual exclusion on sends
/// comes from the busy flag, not the lock.
pub struct ChatController<T: ChatService> {
    service: T,
    state: std::sync::Mutex<ControllerState>,
    events: broadcast::Sender<SessionEvent>,
    reset_policy: ResetPolicy,
}

impl<T: ChatService> ChatController<T> {
    pub fn new(service: T) -> Self {
        Self::with_reset_policy(service, ResetPolicy::default())
    }

    pub fn with_reset_policy(service: T, reset_policy: ResetPolicy) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            service,
            state: std::sync::Mutex::new(ControllerState {
                session: Session::new(),
                log: ConversationLog::new(),
            }),
            events,
            reset_policy,
        }
    }

    /// Subscribe to change events. Late subscribers only see events from
    /// this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_state().session.status()
    }

    pub fn agent_mode(&self) -> AgentMode {
        self.lock_state().session.agent_mode()
    }

    pub fn document_filename(&self) -> Option<String> {
        self.lock_state()
            .session
            .document()
            .map(|d| d.filename.clone())
    }

    /// Snapshot of the conversation log at this instant.
    pub fn turns(&self) -> Vec<Turn> {
        self.lock_state().log.turns().to_vec()
    }

    pub fn select_agent_mode(&self, mode: AgentMode) -> Result<(), ControllerError> {
        let mut state = self.lock_state();
        state.session.select_agent_mode(mode)?;
        tracing::info!(mode = %mode, "agent mode selected");
        Ok(())
    }

    /// Exchange one chat turn.
    ///
    /// The user turn is appended optimistically (trimmed text) before the
    /// network call; the wire message carries the raw input. On transport
    /// failure no bot turn is appended, the user turn stays visible, and
    /// the busy flag is cleared so the session never sticks busy.
    pub async fn send(&self, raw_input: &str) -> Result<Turn, ControllerError> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }

        let (agent_mode, generation) = {
            let mut state = self.lock_state();
            match state.session.status() {
                SessionStatus::Empty => {
                    return Err(ControllerError::InvalidState {
                        action: "send",
                        status: SessionStatus::Empty,
                    })
                }
                SessionStatus::Busy => return Err(ControllerError::ExchangeInFlight),
                SessionStatus::Ready => {}
            }
            state.session.begin_exchange()?;
            let ordinal = state.log.append_user(trimmed).ordinal;
            self.emit(SessionEvent::TurnAppended { ordinal });
            self.emit(SessionEvent::StatusChanged {
                status: SessionStatus::Busy,
            });
            (state.session.agent_mode(), state.session.generation())
        };

        let result = self.service.converse(raw_input, agent_mode).await;

        let mut state = self.lock_state();

        if state.session.generation() != generation {
            // The session this exchange started under was reset (and maybe
            // replaced by a fresh upload) while the reply was in flight.
            // Its log is gone, and the busy flag now belongs to whatever
            // session took its place, so leave both alone.
            tracing::debug!("discarding reply from a superseded session");
            return Err(ControllerError::InvalidState {
                action: "append the reply",
                status: state.session.status(),
            });
        }

        state.session.finish_exchange();
        let status = state.session.status();

        match result {
            Ok(reply) => {
                let turn = state
                    .log
                    .append_bot(reply.text, reply.attachment, reply.produced_by_agent)
                    .clone();
                self.emit(SessionEvent::TurnAppended {
                    ordinal: turn.ordinal,
                });
                self.emit(SessionEvent::StatusChanged { status });
                Ok(turn)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat exchange failed");
                self.emit(SessionEvent::StatusChanged { status });
                self.emit(SessionEvent::ExchangeFailed {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Upload a document and bind the session to it.
    pub async fn upload(&self, file_bytes: Vec<u8>, filename: &str) -> Result<(), ControllerError> {
        {
            let state = self.lock_state();
            let status = state.session.status();
            if status != SessionStatus::Empty {
                return Err(ControllerError::InvalidState {
                    action: "upload",
                    status,
                });
            }
            state.session.begin_upload()?;
        }

        // The service only accepts PDFs; reject locally rather than issue a
        // request guaranteed to come back 400.
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ControllerError::UnsupportedDocument(filename.to_string()));
        }

        let metadata = self.service.upload_document(file_bytes, filename).await?;

        let mut state = self.lock_state();
        state.log.clear();
        state.session.complete_upload(Document {
            filename: metadata.filename,
            server_metadata: metadata.extra,
        })?;
        tracing::info!(filename, "document uploaded, session ready");
        self.emit(SessionEvent::StatusChanged {
            status: SessionStatus::Ready,
        });
        Ok(())
    }

    /// Reset the session, remote side first.
    ///
    /// Local state transitions to Empty only when the remote reset succeeds,
    /// unless the controller was built with `ResetPolicy::LocalFallback`.
    pub async fn reset_session(&self) -> Result<(), ControllerError> {
        {
            let state = self.lock_state();
            let status = state.session.status();
            if status == SessionStatus::Empty {
                return Err(ControllerError::InvalidState {
                    action: "reset",
                    status,
                });
            }
        }

        if let Err(err) = self.service.reset_session().await {
            match self.reset_policy {
                ResetPolicy::RemoteFirst => {
                    tracing::warn!(error = %err, "remote reset failed, keeping local session");
                    return Err(ControllerError::RemoteResetFailed(err));
                }
                ResetPolicy::LocalFallback => {
                    tracing::warn!(error = %err, "remote reset failed, clearing local session anyway");
                }
            }
        }

        let mut state = self.lock_state();
        state.session.reset()?;
        state.log.clear();
        tracing::info!("session reset");
        self.emit(SessionEvent::StatusChanged {
            status: SessionStatus::Empty,
        });
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        self.state.lock().expect("controller state lock poisoned")
    }
}
