//! Test fixtures: utterances grouped by language, plus the language registry
//! used to validate tags at setup time.

use serde::Serialize;

use crate::config::LanguageConfig;

// ---------------------------------------------------------------------------
// Language registry
// ---------------------------------------------------------------------------

/// Language tags the harness accepts, with display names.
///
/// Covers the languages served by the multilingual turn detectors; a sample
/// or predictor scope naming anything else is a configuration error.
pub const KNOWN_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("mr", "Marathi"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

pub fn is_known_language(tag: &str) -> bool {
    KNOWN_LANGUAGES.iter().any(|(t, _)| *t == tag)
}

/// Display name for `tag`, if registered.
pub fn language_name(tag: &str) -> Option<&'static str> {
    KNOWN_LANGUAGES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// LanguageSample
// ---------------------------------------------------------------------------

/// Ordered utterances for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSample {
    tag: String,
    name: String,
    utterances: Vec<String>,
}

impl LanguageSample {
    /// Sample set for `tag`; the display name is looked up from the registry
    /// and falls back to the upper-cased tag.
    pub fn new<I, S>(tag: impl Into<String>, utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag = tag.into();
        let name = language_name(&tag)
            .map(str::to_string)
            .unwrap_or_else(|| tag.to_uppercase());
        Self {
            tag,
            name,
            utterances: utterances.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn from_config(config: &LanguageConfig) -> Self {
        let sample = Self::new(config.tag.clone(), config.utterances.iter().cloned());
        if config.name.is_empty() {
            sample
        } else {
            sample.with_name(config.name.clone())
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }
}

/// Convert the `[[languages]]` config section into samples, in order.
pub fn samples_from_config(languages: &[LanguageConfig]) -> Vec<LanguageSample> {
    languages.iter().map(LanguageSample::from_config).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_languages;

    #[test]
    fn registry_knows_the_default_fixture_languages() {
        for lang in default_languages() {
            assert!(is_known_language(&lang.tag), "{} missing", lang.tag);
        }
        assert!(!is_known_language("xx"));
        assert!(KNOWN_LANGUAGES.len() >= 23);
    }

    #[test]
    fn name_is_looked_up_from_tag() {
        let sample = LanguageSample::new("vi", ["Ok"]);
        assert_eq!(sample.name(), "Vietnamese");
        assert_eq!(sample.utterances(), ["Ok".to_string()]);
    }

    #[test]
    fn unknown_tag_falls_back_to_upper_case() {
        assert_eq!(LanguageSample::new("xx", Vec::<String>::new()).name(), "XX");
    }

    #[test]
    fn config_name_overrides_registry() {
        let config = LanguageConfig {
            tag: "zh".into(),
            name: "Mandarin".into(),
            utterances: vec!["你好".into()],
        };
        assert_eq!(LanguageSample::from_config(&config).name(), "Mandarin");
    }

    #[test]
    fn samples_preserve_config_order() {
        let samples = samples_from_config(&default_languages());
        let tags: Vec<&str> = samples.iter().map(|s| s.tag()).collect();
        assert_eq!(tags, vec!["en", "vi", "zh"]);
        assert_eq!(samples[0].utterances()[0], "Hello, how are you?");
    }
}
