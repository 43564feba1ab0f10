//! Mock chat services for controller tests

use crate::client::{BotReply, ChatService, DocumentMetadata, TransportError};
use crate::session::AgentMode;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn no_outcome_queued(operation: &str) -> TransportError {
    TransportError::MalformedReply(format!("no mock outcome queued for {operation}"))
}

/// Mock chat service returning queued outcomes and recording requests
pub struct MockChatService {
    replies: Mutex<VecDeque<Result<BotReply, TransportError>>>,
    uploads: Mutex<VecDeque<Result<DocumentMetadata, TransportError>>>,
    resets: Mutex<VecDeque<Result<(), TransportError>>>,
    /// Record of (raw message, agent mode) pairs sent to converse
    pub sends: Mutex<Vec<(String, AgentMode)>>,
    /// Record of uploaded filenames
    pub uploaded: Mutex<Vec<String>>,
    reset_count: Mutex<usize>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            uploads: Mutex::new(VecDeque::new()),
            resets: Mutex::new(VecDeque::new()),
            sends: Mutex::new(Vec::new()),
            uploaded: Mutex::new(Vec::new()),
            reset_count: Mutex::new(0),
        }
    }

    pub fn queue_reply(&self, outcome: Result<BotReply, TransportError>) {
        self.replies.lock().unwrap().push_back(outcome);
    }

    pub fn queue_upload(&self, outcome: Result<DocumentMetadata, TransportError>) {
        self.uploads.lock().unwrap().push_back(outcome);
    }

    pub fn queue_reset(&self, outcome: Result<(), TransportError>) {
        self.resets.lock().unwrap().push_back(outcome);
    }

    pub fn recorded_sends(&self) -> Vec<(String, AgentMode)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) -> usize {
        *self.reset_count.lock().unwrap()
    }

    fn pop_reply(&self) -> Result<BotReply, TransportError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(no_outcome_queued("converse")))
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn upload_document(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
    ) -> Result<DocumentMetadata, TransportError> {
        self.uploaded.lock().unwrap().push(filename.to_string());
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(no_outcome_queued("upload_document")))
    }

    async fn converse(
        &self,
        message: &str,
        agent_mode: AgentMode,
    ) -> Result<BotReply, TransportError> {
        self.sends
            .lock()
            .unwrap()
            .push((message.to_string(), agent_mode));
        self.pop_reply()
    }

    async fn reset_session(&self) -> Result<(), TransportError> {
        *self.reset_count.lock().unwrap() += 1;
        self.resets
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(no_outcome_queued("reset_session")))
    }
}

/// Mock whose converse blocks until released, for exercising the busy flag
/// while an exchange is genuinely in flight.
pub struct DelayedMockChatService {
    pub inner: MockChatService,
    /// Notified when converse has been entered
    pub request_started: Arc<Notify>,
    /// Converse completes once this is notified
    pub release: Arc<Notify>,
}

impl DelayedMockChatService {
    pub fn new() -> Self {
        Self {
            inner: MockChatService::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl ChatService for DelayedMockChatService {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<DocumentMetadata, TransportError> {
        self.inner.upload_document(bytes, filename).await
    }

    async fn converse(
        &self,
        message: &str,
        agent_mode: AgentMode,
    ) -> Result<BotReply, TransportError> {
        self.inner
            .sends
            .lock()
            .unwrap()
            .push((message.to_string(), agent_mode));
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.pop_reply()
    }

    async fn reset_session(&self) -> Result<(), TransportError> {
        self.inner.reset_session().await
    }
}
