//! Relay domain - connections, messages, replies and prompts.
//!
//! Pure types with no I/O. The orchestration that ties them to the
//! registry, completion service and gateway lives in
//! `application::handlers::relay`.

mod connection;
mod event;
mod message;
mod prompt;
mod reply;

pub use connection::{ConnectionRecord, ConnectionState};
pub use event::RelayEvent;
pub use message::{decode_frame, ContinuationToken, InboundMessage, Locale, MessageError};
pub use prompt::SystemPrompt;
pub use reply::{OutboundReply, Payload, ReplyEncoding};
