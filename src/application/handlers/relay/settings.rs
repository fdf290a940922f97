//! Per-deployment relay behaviour.

use serde::Deserialize;
use std::time::Duration;

use crate::domain::relay::{Locale, ReplyEncoding, SystemPrompt};
use crate::ports::ModelParameters;

/// What to do with a completion failure that is not an auth failure.
///
/// Auth failures are always propagated and never shown to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionErrorPolicy {
    /// Push a short human-readable message to the peer and carry on.
    #[default]
    ReportToPeer,
    /// Return the failure to the invoking transport; nothing is pushed.
    Propagate,
}

/// Everything the relay needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Instructions sent with every completion request.
    pub system_prompt: SystemPrompt,
    /// Generation parameters sent with every completion request.
    pub parameters: ModelParameters,
    /// Frame encoding for replies and error reports.
    pub encoding: ReplyEncoding,
    /// Handling of non-auth completion failures.
    pub on_completion_error: CompletionErrorPolicy,
    /// Locale used when a message carries none.
    pub default_locale: Locale,
    /// Upper bound on one completion call.
    pub completion_deadline: Duration,
}

impl RelaySettings {
    pub fn with_system_prompt(mut self, prompt: SystemPrompt) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_encoding(mut self, encoding: ReplyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_error_policy(mut self, policy: CompletionErrorPolicy) -> Self {
        self.on_completion_error = policy;
        self
    }

    pub fn with_completion_deadline(mut self, deadline: Duration) -> Self {
        self.completion_deadline = deadline;
        self
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            system_prompt: SystemPrompt::default(),
            parameters: ModelParameters::default(),
            encoding: ReplyEncoding::default(),
            on_completion_error: CompletionErrorPolicy::default(),
            default_locale: Locale::default(),
            completion_deadline: Duration::from_secs(300),
        }
    }
}
