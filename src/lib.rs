//! Chat Relay - WebSocket relay to a conversational completion service
//!
//! Peers connect over WebSocket (natively, or through a managed WebSocket
//! service), send chat messages, and receive the completion service's
//! replies on the same connection. Conversation threads are carried by the
//! peer as continuation tokens; the relay itself only remembers which
//! connections are live.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
