//! Harness settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a file only needs to list what it overrides.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Evaluation engine knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-call timeout applied to `score` and `decision_threshold`.
    pub timeout_ms: u64,
    /// Number of (sample, predictor) pairs measured at once.  `1` keeps the
    /// strictly sequential reference behaviour.
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            concurrency: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Output format of the comparison report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Console table grouped by language and sample.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Append the per-predictor coverage / aggregate summary.
    pub show_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            show_summary: true,
        }
    }
}

// ---------------------------------------------------------------------------
// LanguageConfig
// ---------------------------------------------------------------------------

/// One block of test utterances for a language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Short language code (`"en"`, `"vi"`, `"zh"`, …).
    pub tag: String,
    /// Display name; empty means "look it up from the tag".
    #[serde(default)]
    pub name: String,
    pub utterances: Vec<String>,
}

impl LanguageConfig {
    fn new(tag: &str, name: &str, utterances: &[&str]) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            utterances: utterances.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The built-in fixture set: greetings, questions and a few deliberately
/// unfinished Vietnamese fragments.
pub fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new(
            "en",
            "English",
            &[
                "Hello, how are you?",
                "What's the weather like today?",
                "I need help with my computer",
            ],
        ),
        LanguageConfig::new(
            "vi",
            "Vietnamese",
            &[
                "Xin chào, bạn khỏe không?",
                "Thời tiết hôm nay thế nào?",
                "Tôi cần giúp đỡ về máy tính",
                "Em đang cần",
                "Mình muốn",
                "Vay ở đâu",
                "Có nhé",
                "Ok",
                "Anh đang bận nhé, gọi lại sau cho anh",
            ],
        ),
        LanguageConfig::new(
            "zh",
            "Chinese",
            &["你好，你好吗？", "今天天气怎么样？", "我需要电脑方面的帮助"],
        ),
    ]
}

// ---------------------------------------------------------------------------
// PredictorConfig
// ---------------------------------------------------------------------------

/// Which backend implements a configured predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// HTTP inference server hosting a turn-detector model.
    Remote,
    /// Built-in rule-based baseline (no model, no network).
    Heuristic,
}

/// A predictor to register with the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Display name; must be unique within a run.
    pub name: String,
    pub kind: PredictorKind,
    /// Coverage note printed in the report summary.
    #[serde(default)]
    pub description: String,
    /// Languages this registration is evaluated for.  `None` = every sample.
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    /// Languages the underlying model can handle.  `None` = unrestricted.
    #[serde(default)]
    pub supported_languages: Option<Vec<String>>,
    /// Base URL of the inference server (remote only).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the inference server (remote only).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier sent to the server (remote only).
    #[serde(default)]
    pub model: Option<String>,
    /// HTTP client timeout in seconds (remote only).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Trailing turns forwarded to the model.
    #[serde(default = "default_history_turns")]
    pub max_history_turns: usize,
    /// Per-language decision thresholds.  Missing language = undecidable.
    #[serde(default)]
    pub thresholds: BTreeMap<String, f32>,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_history_turns() -> usize {
    crate::predictor::context::DEFAULT_HISTORY_TURNS
}

const DEFAULT_BASE_URL: &str = "http://localhost:8088";

impl PredictorConfig {
    /// Remote predictor with the defaults shared by all built-in entries.
    pub fn remote(name: &str, model: &str, thresholds: &[(&str, f32)]) -> Self {
        Self {
            name: name.into(),
            kind: PredictorKind::Remote,
            description: String::new(),
            languages: None,
            supported_languages: None,
            base_url: Some(DEFAULT_BASE_URL.into()),
            api_key: None,
            model: Some(model.into()),
            request_timeout_secs: default_request_timeout_secs(),
            max_history_turns: default_history_turns(),
            thresholds: thresholds
                .iter()
                .map(|(tag, t)| (tag.to_string(), *t))
                .collect(),
        }
    }

    /// Rule-based baseline predictor.
    pub fn heuristic(name: &str, thresholds: &[(&str, f32)]) -> Self {
        Self {
            kind: PredictorKind::Heuristic,
            base_url: None,
            model: None,
            ..Self::remote(name, "", thresholds)
        }
    }

    /// Restrict this registration (and the model's declared capability) to
    /// exactly one language.
    pub fn scoped_to(mut self, tag: &str) -> Self {
        self.languages = Some(vec![tag.into()]);
        self.supported_languages = Some(vec![tag.into()]);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.into();
        self
    }
}

/// Built-in predictor line-up: the Namo and LiveKit detector families plus
/// the heuristic baseline so a run produces decisions without any server.
pub fn default_predictors() -> Vec<PredictorConfig> {
    let specialised = "Optimized per language (en, vi, zh)";
    vec![
        PredictorConfig::remote(
            "Namo Multilingual",
            "namo-turn-detector-v1-multilingual",
            &[("en", 0.5), ("vi", 0.5), ("zh", 0.5)],
        )
        .describe("Supports 23+ languages"),
        PredictorConfig::remote("Namo English-Specific", "namo-turn-detector-v1-en", &[("en", 0.5)])
            .scoped_to("en")
            .describe(specialised),
        PredictorConfig::remote(
            "Namo Vietnamese-Specific",
            "namo-turn-detector-v1-vi",
            &[("vi", 0.5)],
        )
        .scoped_to("vi")
        .describe(specialised),
        PredictorConfig::remote("Namo Chinese-Specific", "namo-turn-detector-v1-zh", &[("zh", 0.5)])
            .scoped_to("zh")
            .describe(specialised),
        // No calibrated Vietnamese threshold: Vietnamese samples are undecidable.
        PredictorConfig::remote(
            "LiveKit Multilingual",
            "livekit-turn-detector-multilingual",
            &[("en", 0.0289), ("zh", 0.0134)],
        )
        .describe("Baseline multilingual model"),
        PredictorConfig::remote("LiveKit English", "livekit-turn-detector-en", &[("en", 0.0145)])
            .scoped_to("en")
            .describe("English-only model"),
        PredictorConfig::heuristic("Punctuation Baseline", &[("en", 0.5), ("vi", 0.5), ("zh", 0.5)])
            .describe("Rule-based reference: terminal punctuation and continuation words"),
    ]
}

// ---------------------------------------------------------------------------
// HarnessConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `harness.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use eot_compare::config::HarnessConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = HarnessConfig::load().unwrap();
/// assert!(!config.predictors.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub engine: EngineConfig,
    pub report: ReportConfig,
    /// Test fixtures, evaluated in the order listed.
    pub languages: Vec<LanguageConfig>,
    /// Predictors, evaluated in the order listed.
    pub predictors: Vec<PredictorConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            report: ReportConfig::default(),
            languages: default_languages(),
            predictors: default_predictors(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from the platform-appropriate `harness.toml`.
    ///
    /// Returns `Ok(HarnessConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `harness.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("harness.toml");

        let original = HarnessConfig::default();
        original.save_to(&path).expect("save");

        let loaded = HarnessConfig::load_from(&path).expect("load");

        assert_eq!(original.engine.timeout_ms, loaded.engine.timeout_ms);
        assert_eq!(original.engine.concurrency, loaded.engine.concurrency);
        assert_eq!(original.report.format, loaded.report.format);
        assert_eq!(original.report.show_summary, loaded.report.show_summary);
        assert_eq!(original.languages, loaded.languages);
        assert_eq!(original.predictors, loaded.predictors);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = HarnessConfig::load_from(&path).expect("should not error");
        assert_eq!(config.languages, default_languages());
        assert_eq!(config.predictors.len(), default_predictors().len());
    }

    #[test]
    fn default_values() {
        let cfg = HarnessConfig::default();

        assert_eq!(cfg.engine.timeout_ms, 5_000);
        assert_eq!(cfg.engine.concurrency, 1);
        assert_eq!(cfg.report.format, ReportFormat::Text);

        let tags: Vec<&str> = cfg.languages.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["en", "vi", "zh"]);
        assert_eq!(cfg.languages[1].utterances.len(), 9);

        let english = cfg
            .predictors
            .iter()
            .find(|p| p.name == "LiveKit English")
            .expect("LiveKit English present");
        assert_eq!(english.languages, Some(vec!["en".to_string()]));

        let livekit_multi = cfg
            .predictors
            .iter()
            .find(|p| p.name == "LiveKit Multilingual")
            .unwrap();
        assert!(livekit_multi.languages.is_none());
        assert!(!livekit_multi.thresholds.contains_key("vi"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            r#"
[engine]
timeout_ms = 250

[[languages]]
tag = "en"
utterances = ["Is it done?"]

[[predictors]]
name = "baseline"
kind = "heuristic"

[predictors.thresholds]
en = 0.7
"#,
        )
        .unwrap();

        let cfg = HarnessConfig::load_from(&path).expect("load");
        assert_eq!(cfg.engine.timeout_ms, 250);
        assert_eq!(cfg.engine.concurrency, 1);
        assert!(cfg.report.show_summary);
        assert_eq!(cfg.languages.len(), 1);
        assert!(cfg.languages[0].name.is_empty());
        assert_eq!(cfg.predictors.len(), 1);
        assert_eq!(cfg.predictors[0].kind, PredictorKind::Heuristic);
        assert_eq!(cfg.predictors[0].thresholds.get("en"), Some(&0.7));
        assert_eq!(cfg.predictors[0].max_history_turns, 6);
        assert_eq!(cfg.predictors[0].request_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[engine\ntimeout_ms = ").unwrap();
        assert!(HarnessConfig::load_from(&path).is_err());
    }
}
