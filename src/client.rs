//! Transport client for the document-chat service
//!
//! Provides the `ChatService` seam the controller drives, plus the
//! `reqwest`-backed implementation. Reply normalization (the polymorphic
//! `response` field) happens here, once; the rest of the system only ever
//! sees `BotReply`.

mod error;
mod http;
mod types;

pub use error::TransportError;
pub use http::HttpChatService;
pub use types::{BotReply, DocumentMetadata};

use crate::session::AgentMode;
use async_trait::async_trait;
use std::sync::Arc;

/// The three remote operations the session controller relies on.
/// One request/response exchange each; no retries.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Upload a document, returning the server's metadata for it
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<DocumentMetadata, TransportError>;

    /// Exchange one chat turn, returning the normalized reply
    async fn converse(
        &self,
        message: &str,
        agent_mode: AgentMode,
    ) -> Result<BotReply, TransportError>;

    /// Ask the service to drop its copy of the session
    async fn reset_session(&self) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<DocumentMetadata, TransportError> {
        (**self).upload_document(bytes, filename).await
    }

    async fn converse(
        &self,
        message: &str,
        agent_mode: AgentMode,
    ) -> Result<BotReply, TransportError> {
        (**self).converse(message, agent_mode).await
    }

    async fn reset_session(&self) -> Result<(), TransportError> {
        (**self).reset_session().await
    }
}
