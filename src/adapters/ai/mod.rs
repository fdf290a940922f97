//! Completion Client Adapters.
//!
//! Implementations of the CompletionClient port.
//!
//! ## Available Adapters
//!
//! - `MockCompletionClient` - Configurable mock for testing
//! - `OpenAICompletionClient` - OpenAI Responses API

mod mock_completion;
mod openai_completion;

pub use mock_completion::MockCompletionClient;
pub use openai_completion::{OpenAICompletionClient, OpenAIConfig};
