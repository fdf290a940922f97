//! Outbound replies and how they are framed for the peer.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ContinuationToken;

/// How frames pushed to peers are encoded.
///
/// Chosen once per deployment; replies and error reports always share the
/// same encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyEncoding {
    /// Reply text as-is; errors as their message text.
    PlainText,
    /// `{"text": .., "continuationToken": ..}`; errors as `{"error": ..}`.
    #[default]
    Json,
}

/// One response unit destined for a single connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub text: String,
    pub continuation: Option<ContinuationToken>,
}

impl OutboundReply {
    pub fn new(text: impl Into<String>, continuation: Option<ContinuationToken>) -> Self {
        Self {
            text: text.into(),
            continuation,
        }
    }
}

/// An encoded frame ready to be pushed through a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl ReplyEncoding {
    /// Encodes a successful reply.
    pub fn encode_reply(&self, reply: &OutboundReply) -> Payload {
        match self {
            ReplyEncoding::PlainText => Payload::new(reply.text.clone()),
            ReplyEncoding::Json => {
                let mut body = json!({ "text": reply.text });
                if let Some(token) = &reply.continuation {
                    body["continuationToken"] = json!(token.as_str());
                }
                Payload::new(body.to_string())
            }
        }
    }

    /// Encodes a human-readable error report.
    pub fn encode_error(&self, message: &str) -> Payload {
        match self {
            ReplyEncoding::PlainText => Payload::new(message),
            ReplyEncoding::Json => Payload::new(json!({ "error": message }).to_string()),
        }
    }
}
