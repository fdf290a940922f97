//! Inbound message parsing and the thread continuation token.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque token linking a reply to its conversation thread.
///
/// Returned by the completion service with every reply and sent back by the
/// peer on the next message of the same thread. Never inspected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a token value exactly as received.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language hint for the reply (e.g. `en`, `fr`, `pt-BR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Language used when a message carries no locale.
    pub const DEFAULT: &'static str = "en";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons an inbound frame cannot be relayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Payload is not the expected JSON shape.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Payload parsed but carries no text to relay.
    #[error("Malformed message: text cannot be empty")]
    EmptyText,

    /// Binary frame whose bytes are not UTF-8.
    #[error("Malformed message: binary frame is not valid UTF-8")]
    NotUtf8,
}

/// Decodes a binary frame body so it can be relayed like a text frame.
pub fn decode_frame(bytes: Vec<u8>) -> Result<String, MessageError> {
    String::from_utf8(bytes).map_err(|_| MessageError::NotUtf8)
}

/// One request unit received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub locale: Option<Locale>,
    pub continuation: Option<ContinuationToken>,
}

/// Wire shape of a message frame.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageFrame {
    text: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    parent_message_id: Option<String>,
}

impl InboundMessage {
    /// Creates a message with no locale and no thread.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: None,
            continuation: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(Locale::new(locale));
        self
    }

    pub fn with_continuation(mut self, token: impl Into<String>) -> Self {
        self.continuation = Some(ContinuationToken::new(token));
        self
    }

    /// Parses a raw frame body.
    ///
    /// Blank `locale` and `parentMessageId` values are treated as absent so a
    /// placeholder never reaches the completion service.
    pub fn parse(body: &str) -> Result<Self, MessageError> {
        let frame: MessageFrame =
            serde_json::from_str(body).map_err(|e| MessageError::Malformed(e.to_string()))?;

        if frame.text.trim().is_empty() {
            return Err(MessageError::EmptyText);
        }

        Ok(Self {
            text: frame.text,
            locale: frame
                .locale
                .filter(|l| !l.trim().is_empty())
                .map(|l| Locale::new(l.trim())),
            continuation: frame
                .parent_message_id
                .filter(|t| !t.is_empty())
                .map(ContinuationToken::new),
        })
    }
}
