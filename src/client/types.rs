//! Wire types for the document-chat service

use crate::session::AgentMode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upload response: at least a filename, plus whatever else the server
/// reports about ingestion (chunk counts, text length). Extra fields are
/// preserved verbatim as opaque metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized converse reply — the only reply shape the rest of the
/// system sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub attachment: Option<String>,
    pub produced_by_agent: Option<String>,
}

/// Body of POST /chat
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub agent_type: AgentMode,
}

/// Body of a 2xx /chat response. The `response` field is polymorphic;
/// deserialization failure of the whole body is a malformed reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub response: ResponsePayload,
    #[serde(default)]
    pub agent_used: Option<String>,
}

/// The polymorphic `response` field: either the reply text directly, or a
/// structured object carrying text plus an optional generated-file link.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResponsePayload {
    Text(String),
    Structured {
        // A structured reply without `message` normalizes to empty text
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        file_path: Option<String>,
    },
}

impl ChatResponse {
    pub(crate) fn into_reply(self) -> BotReply {
        match self.response {
            ResponsePayload::Text(text) => BotReply {
                text,
                attachment: None,
                produced_by_agent: self.agent_used,
            },
            ResponsePayload::Structured { message, file_path } => BotReply {
                text: message.unwrap_or_default(),
                attachment: file_path,
                produced_by_agent: self.agent_used,
            },
        }
    }
}
