//! Turns `[[predictors]]` config entries into engine registrations.

use std::sync::Arc;

use crate::config::{PredictorConfig, PredictorKind};
use crate::eval::ConfigurationError;
use crate::predictor::detector::EotPredictor;
use crate::predictor::handle::{LanguageScope, PredictorHandle};
use crate::predictor::heuristic::HeuristicPredictor;
use crate::predictor::remote::RemotePredictor;

fn invalid(config: &PredictorConfig, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidPredictor {
        predictor: config.name.clone(),
        reason: reason.into(),
    }
}

/// Build one handle, validating the entry first.
pub fn build_handle(config: &PredictorConfig) -> Result<PredictorHandle, ConfigurationError> {
    if config.name.trim().is_empty() {
        return Err(invalid(config, "name must not be empty"));
    }

    for (tag, t) in &config.thresholds {
        if !(0.0..=1.0).contains(t) {
            return Err(invalid(
                config,
                format!("threshold {t} for `{tag}` is outside [0, 1]"),
            ));
        }
    }

    let predictor: Arc<dyn EotPredictor> = match config.kind {
        PredictorKind::Remote => {
            let base_url = config
                .base_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| invalid(config, "remote predictor needs `base_url`"))?;
            if config.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
                return Err(invalid(config, "remote predictor needs `model`"));
            }
            Arc::new(RemotePredictor::from_config(config, base_url))
        }
        PredictorKind::Heuristic => Arc::new(HeuristicPredictor::from_config(config)),
    };

    log::debug!(
        "registry: {} predictor `{}` ({:?})",
        match config.kind {
            PredictorKind::Remote => "remote",
            PredictorKind::Heuristic => "heuristic",
        },
        config.name,
        config.languages
    );

    Ok(PredictorHandle::new(config.name.clone(), predictor)
        .with_scope(LanguageScope::from_tags(config.languages.clone()))
        .with_description(config.description.clone()))
}

/// Build every configured predictor, in order.  Stops at the first invalid entry.
pub fn build_handles(configs: &[PredictorConfig]) -> Result<Vec<PredictorHandle>, ConfigurationError> {
    configs.iter().map(build_handle).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_predictors;

    #[test]
    fn default_lineup_builds() {
        let handles = build_handles(&default_predictors()).unwrap();
        assert_eq!(handles.len(), 7);
        assert_eq!(handles[0].name(), "Namo Multilingual");
        assert_eq!(handles[0].scope(), &LanguageScope::Any);
        assert_eq!(handles[0].description(), "Supports 23+ languages");
        assert_eq!(handles[2].scope(), &LanguageScope::single("vi"));
    }

    #[test]
    fn scoped_entry_declares_limited_capability() {
        let handle = build_handle(&PredictorConfig::remote("en", "m", &[]).scoped_to("en")).unwrap();
        assert!(handle.predictor().supports_language("en"));
        assert!(!handle.predictor().supports_language("vi"));
    }

    #[test]
    fn remote_without_base_url_is_rejected() {
        let mut config = PredictorConfig::remote("r", "model", &[]);
        config.base_url = None;
        let err = build_handle(&config).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPredictor { ref reason, .. } if reason.contains("base_url")));

        config.base_url = Some("  ".into());
        assert!(build_handle(&config).is_err());
    }

    #[test]
    fn remote_without_model_is_rejected() {
        let mut config = PredictorConfig::remote("r", "model", &[]);
        config.model = Some(String::new());
        let err = build_handle(&config).unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn heuristic_needs_no_endpoint() {
        let handle = build_handle(&PredictorConfig::heuristic("h", &[])).unwrap();
        assert_eq!(handle.name(), "h");
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let config = PredictorConfig::heuristic("h", &[("en", 1.2)]);
        assert!(build_handle(&config).is_err());

        let config = PredictorConfig::heuristic("h", &[("en", f32::NAN)]);
        assert!(build_handle(&config).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(build_handle(&PredictorConfig::heuristic(" ", &[])).is_err());
    }

    #[test]
    fn build_handles_stops_at_first_error() {
        let mut configs = default_predictors();
        configs[3].model = None;
        let err = build_handles(&configs).unwrap_err();
        assert!(err.to_string().contains("Namo Chinese-Specific"));
    }
}
