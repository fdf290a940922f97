//! Thread tracking - turns an inbound message into a completion request.
//!
//! Conversation state lives with the peer: the continuation token it sends
//! is passed to the completion service untouched, and nothing is stored
//! server-side between messages.

use crate::domain::relay::InboundMessage;
use crate::ports::CompletionRequest;

use super::RelaySettings;

/// Builds the completion request for one inbound message.
pub fn completion_request(message: InboundMessage, settings: &RelaySettings) -> CompletionRequest {
    let locale = message
        .locale
        .unwrap_or_else(|| settings.default_locale.clone());

    CompletionRequest::new(message.text, settings.system_prompt.render(&locale))
        .with_continuation(message.continuation)
        .with_parameters(settings.parameters)
}
