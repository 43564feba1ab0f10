//! HTTP implementation of the chat service

use super::types::{ChatRequest, ChatResponse};
use super::{BotReply, ChatService, DocumentMetadata, TransportError};
use crate::session::AgentMode;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// `reqwest`-backed client for the document-chat service.
///
/// One request per operation, no retries; the client-level timeout bounds
/// every exchange and surfaces expiry as a network error.
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probe GET / so callers can warn early about an unreachable service.
    /// Not part of the `ChatService` contract.
    pub async fn health_check(&self) -> Result<(), TransportError> {
        self.client
            .get(self.endpoint("/"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<DocumentMetadata, TransportError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        tracing::debug!(filename, "uploading document");
        let response = self
            .client
            .post(self.endpoint("/upload-pdf"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "document upload rejected");
            return Err(TransportError::UploadFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        // A 2xx body that is not valid metadata still counts as a failed upload
        serde_json::from_str(&body).map_err(|e| TransportError::UploadFailed {
            status: status.as_u16(),
            message: format!("unparseable upload response: {e}"),
        })
    }

    async fn converse(
        &self,
        message: &str,
        agent_mode: AgentMode,
    ) -> Result<BotReply, TransportError> {
        let request = ChatRequest {
            message,
            agent_type: agent_mode,
        };

        tracing::debug!(agent_mode = %agent_mode, "sending chat message");
        let response = self
            .client
            .post(self.endpoint("/chat"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "chat request rejected");
            return Err(TransportError::ConverseFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::MalformedReply(e.to_string()))?;
        Ok(parsed.into_reply())
    }

    async fn reset_session(&self) -> Result<(), TransportError> {
        tracing::debug!("requesting session reset");
        let response = self.client.delete(self.endpoint("/reset")).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "session reset rejected");
            return Err(TransportError::ResetFailed {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}
