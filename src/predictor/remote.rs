//! `RemotePredictor`: turn-detector model served over HTTP.
//!
//! The server receives the recent dialogue and answers with a single
//! probability:
//!
//! ```text
//! POST {base_url}/v1/turn/predict
//! { "model": "namo-turn-detector-v1-vi",
//!   "messages": [ { "role": "user", "content": "Em đang cần" } ] }
//!
//! 200 OK
//! { "probability": 0.0731 }
//! ```
//!
//! Decision thresholds are not fetched from the server; they come from the
//! per-language table in [`PredictorConfig::thresholds`].

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::config::PredictorConfig;
use crate::predictor::context::ChatContext;
use crate::predictor::detector::{check_context, check_probability, EotPredictor, InferenceError};

/// Calls a turn-detection inference server.
///
/// All connection details come from the [`PredictorConfig`] passed to
/// [`RemotePredictor::from_config`].
pub struct RemotePredictor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_history_turns: usize,
    supported: Option<BTreeSet<String>>,
    thresholds: BTreeMap<String, f32>,
}

impl RemotePredictor {
    /// Build from config.  `base_url` must already be validated as present.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.request_timeout_secs`; a default client is used if the builder
    /// fails.
    pub fn from_config(config: &PredictorConfig, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: format!("{}/v1/turn/predict", base_url.trim_end_matches('/')),
            model: config.model.clone().unwrap_or_default(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_history_turns: config.max_history_turns.max(1),
            supported: config
                .supported_languages
                .as_ref()
                .map(|tags| tags.iter().cloned().collect()),
            thresholds: config.thresholds.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EotPredictor for RemotePredictor {
    async fn score(&self, ctx: &ChatContext) -> Result<f32, InferenceError> {
        check_context(ctx)?;

        let body = serde_json::json!({
            "model":    self.model,
            "messages": ctx.recent(self.max_history_turns),
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        let probability = json["probability"]
            .as_f64()
            .ok_or_else(|| InferenceError::Parse(format!("no numeric `probability` in {json}")))?;

        check_probability(probability as f32)
    }

    async fn decision_threshold(&self, language: &str) -> Result<Option<f32>, InferenceError> {
        Ok(self.thresholds.get(language).copied())
    }

    fn supports_language(&self, language: &str) -> bool {
        self.supported
            .as_ref()
            .map_or(true, |tags| tags.contains(language))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
