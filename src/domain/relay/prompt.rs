//! System prompt templates.

use serde::{Deserialize, Serialize};

use super::Locale;

/// Behavioural instructions sent with every completion request.
///
/// The template may contain `{locale}` placeholders; they are replaced with
/// the message locale when rendered. A template without a placeholder gets a
/// trailing language instruction instead, so the locale always reaches the
/// completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemPrompt(String);

impl SystemPrompt {
    pub const LOCALE_PLACEHOLDER: &'static str = "{locale}";

    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn template(&self) -> &str {
        &self.0
    }

    /// Renders the instruction text for one message.
    pub fn render(&self, locale: &Locale) -> String {
        if self.0.contains(Self::LOCALE_PLACEHOLDER) {
            self.0.replace(Self::LOCALE_PLACEHOLDER, locale.as_str())
        } else {
            let base = self.0.trim_end();
            let sep = if base.is_empty() { "" } else { "\n" };
            format!(
                "{}{}Reply in the language with locale code {}.",
                base,
                sep,
                locale.as_str()
            )
        }
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new(
            "You are a Tailwind CSS specialist and only Tailwind CSS is supported. \
             Be extremely concise: answer with the list of utility classes that produce \
             the requested styling, formatted like `text-lg bg-blue-500`. \
             Always reply in the language with locale code {locale}.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn placeholder_is_replaced() {
        let prompt = SystemPrompt::new("Answer in {locale}. Be brief.");
        assert_eq!(prompt.render(&Locale::new("fr")), "Answer in fr. Be brief.");
    }

    #[test]
    fn every_placeholder_is_replaced() {
        let prompt = SystemPrompt::new("{locale} / {locale}");
        assert_eq!(prompt.render(&Locale::new("de")), "de / de");
    }

    #[test]
    fn template_without_placeholder_gets_language_line() {
        let prompt = SystemPrompt::new("Be brief.");
        assert_eq!(
            prompt.render(&Locale::default()),
            "Be brief.\nReply in the language with locale code en."
        );
    }

    #[test]
    fn empty_template_still_names_locale() {
        let prompt = SystemPrompt::new("");
        assert_eq!(
            prompt.render(&Locale::new("es")),
            "Reply in the language with locale code es."
        );
    }

    #[test]
    fn default_prompt_is_locale_aware() {
        let rendered = SystemPrompt::default().render(&Locale::new("fr"));
        assert!(rendered.contains("locale code fr"));
        assert!(!rendered.contains("{locale}"));
    }

    proptest! {
        #[test]
        fn rendered_prompt_always_contains_locale(
            template in ".{0,80}",
            locale in "[a-z]{2}(-[A-Z]{2})?",
        ) {
            let rendered = SystemPrompt::new(template).render(&Locale::new(locale.clone()));
            prop_assert!(rendered.contains(&locale));
        }
    }
}
