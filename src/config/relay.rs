//! Relay behaviour configuration
//!
//! A deployment's behaviour comes from three places, later ones winning:
//! built-in defaults, the `completion` section, and an optional YAML preset
//! file that bundles a system prompt with its model parameters.
//!
//! ```yaml
//! # presets/tailwind.yaml
//! system_prompt: |
//!   You are a Tailwind CSS expert. Reply in {locale}.
//! max_output_tokens: 2048
//! temperature: 0.0
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::application::{CompletionErrorPolicy, RelaySettings};
use crate::domain::relay::{Locale, ReplyEncoding, SystemPrompt};
use crate::ports::ModelParameters;

use super::completion::CompletionConfig;
use super::error::{ConfigError, ValidationError};

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Inline system prompt template (`{locale}` is substituted)
    pub system_prompt: Option<String>,

    /// Path to a YAML preset; overrides the inline prompt and model parameters
    pub preset_file: Option<String>,

    /// Frame encoding pushed to peers
    #[serde(default)]
    pub reply_encoding: ReplyEncoding,

    /// Handling of non-auth completion failures
    #[serde(default)]
    pub on_completion_error: CompletionErrorPolicy,

    /// Locale used when a message carries none
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

/// Behavioural preset loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub system_prompt: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Preset {
    /// Reads and parses a preset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::PresetUnreadable {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&text).map_err(|e| ConfigError::PresetInvalid {
            path: display,
            reason: e.to_string(),
        })
    }
}

impl RelayConfig {
    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_locale.trim().is_empty() {
            return Err(ValidationError::MissingRequired("RELAY__DEFAULT_LOCALE"));
        }
        if self
            .system_prompt
            .as_ref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(ValidationError::MissingRequired("RELAY__SYSTEM_PROMPT"));
        }
        Ok(())
    }

    /// Builds the relay settings, reading the preset file if one is set.
    pub fn settings(&self, completion: &CompletionConfig) -> Result<RelaySettings, ConfigError> {
        let preset = match &self.preset_file {
            Some(path) => Preset::load(path)?,
            None => Preset::default(),
        };
        Ok(self.settings_with(completion, preset))
    }

    fn settings_with(&self, completion: &CompletionConfig, preset: Preset) -> RelaySettings {
        let system_prompt = preset
            .system_prompt
            .or_else(|| self.system_prompt.clone())
            .map(SystemPrompt::new)
            .unwrap_or_default();

        let parameters = ModelParameters {
            max_output_tokens: preset
                .max_output_tokens
                .unwrap_or(completion.max_output_tokens),
            temperature: preset.temperature.unwrap_or(completion.temperature),
        };

        let mut settings = RelaySettings::default()
            .with_system_prompt(system_prompt)
            .with_parameters(parameters)
            .with_encoding(self.reply_encoding)
            .with_error_policy(self.on_completion_error)
            .with_completion_deadline(completion.timeout());
        settings.default_locale = Locale::new(self.default_locale.trim());
        settings
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            preset_file: None,
            reply_encoding: ReplyEncoding::default(),
            on_completion_error: CompletionErrorPolicy::default(),
            default_locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    Locale::DEFAULT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_relay_config_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.reply_encoding, ReplyEncoding::Json);
        assert_eq!(config.on_completion_error, CompletionErrorPolicy::ReportToPeer);
        assert_eq!(config.default_locale, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_take_parameters_from_completion_section() {
        let completion = CompletionConfig {
            timeout_secs: 600,
            max_output_tokens: 512,
            temperature: 0.7,
            ..Default::default()
        };
        let config = RelayConfig {
            system_prompt: Some("Be brief. {locale}".to_string()),
            ..Default::default()
        };

        let settings = config.settings(&completion).unwrap();
        assert_eq!(settings.parameters.max_output_tokens, 512);
        assert_eq!(settings.parameters.temperature, 0.7);
        assert_eq!(settings.completion_deadline, Duration::from_secs(600));
        assert_eq!(settings.system_prompt.template(), "Be brief. {locale}");
    }

    #[test]
    fn test_preset_file_overrides_prompt_and_parameters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "system_prompt: |\n  You are a Tailwind expert. Reply in {{locale}}.\nmax_output_tokens: 2048\ntemperature: 0.0"
        )
        .unwrap();

        let config = RelayConfig {
            system_prompt: Some("ignored".to_string()),
            preset_file: Some(file.path().display().to_string()),
            ..Default::default()
        };

        let settings = config.settings(&CompletionConfig::default()).unwrap();
        assert_eq!(settings.parameters.max_output_tokens, 2048);
        assert_eq!(settings.parameters.temperature, 0.0);
        assert_eq!(
            settings.system_prompt.render(&Locale::new("de")).trim_end(),
            "You are a Tailwind expert. Reply in de."
        );
    }

    #[test]
    fn test_partial_preset_keeps_other_values() {
        let completion = CompletionConfig {
            max_output_tokens: 300,
            ..Default::default()
        };
        let preset = Preset {
            temperature: Some(1.0),
            ..Default::default()
        };

        let settings = RelayConfig::default().settings_with(&completion, preset);
        assert_eq!(settings.parameters.max_output_tokens, 300);
        assert_eq!(settings.parameters.temperature, 1.0);
        assert_eq!(settings.system_prompt, SystemPrompt::default());
    }

    #[test]
    fn test_missing_preset_file_is_an_error() {
        let config = RelayConfig {
            preset_file: Some("/definitely/not/here.yaml".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.settings(&CompletionConfig::default()),
            Err(ConfigError::PresetUnreadable { .. })
        ));
    }

    #[test]
    fn test_unknown_preset_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "system_promt: typo").unwrap();

        assert!(matches!(
            Preset::load(file.path()),
            Err(ConfigError::PresetInvalid { .. })
        ));
    }

    #[test]
    fn test_blank_locale_is_invalid() {
        let config = RelayConfig {
            default_locale: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
