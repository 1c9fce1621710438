//! Evaluation engine: drives every applicable predictor over every sample.
//!
//! # Flow
//!
//! ```text
//! run(samples)
//!   └─▶ validate()                      ConfigurationError → abort, nothing measured
//!   └─▶ for language → utterance → predictor (registration order)
//!         ├─ skip if the handle's scope excludes the language
//!         ├─ fresh ChatContext { user: utterance }
//!         ├─ Instant::now() … score() … elapsed     [timeout → InferenceError::Timeout]
//!         ├─ decision_threshold(language)           [cached per predictor + language]
//!         └─ EvaluationResult (decision derived)    [InferenceError → recorded, run continues]
//! ```
//!
//! With `concurrency > 1` the pairs run as tokio tasks behind a
//! [`Semaphore`]; the timer starts only after a permit is held, and results
//! are collected per task and merged in the fixed order afterwards.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::EngineConfig;
use crate::eval::fixture::{is_known_language, LanguageSample};
use crate::eval::result::{ComparisonRun, EvaluationResult, LanguageInfo, PredictorInfo, ResultKey};
use crate::predictor::{
    check_probability, ChatContext, EotPredictor, InferenceError, LanguageScope, PredictorHandle,
};

// ---------------------------------------------------------------------------
// ConfigurationError
// ---------------------------------------------------------------------------

/// Harness misconfiguration, detected before any measurement starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no predictors registered")]
    NoPredictors,

    #[error("predictor name `{0}` is registered more than once")]
    DuplicatePredictor(String),

    #[error("predictor `{0}` is scoped to an empty language list")]
    EmptyScope(String),

    #[error("predictor `{predictor}` would be evaluated for `{language}`, which it does not support")]
    UnsupportedLanguage { predictor: String, language: String },

    #[error("unknown language code `{language}` ({origin})")]
    UnknownLanguage { language: String, origin: String },

    #[error("language `{0}` appears in more than one sample block")]
    DuplicateLanguage(String),

    #[error("language filter names `{0}`, which has no samples")]
    FilterNotInSamples(String),

    #[error("invalid predictor `{predictor}`: {reason}")]
    InvalidPredictor { predictor: String, reason: String },
}

// ---------------------------------------------------------------------------
// Threshold cache
// ---------------------------------------------------------------------------

/// Successful `decision_threshold` lookups for one run, keyed by
/// (predictor name, language).
#[derive(Default)]
struct ThresholdCache {
    entries: Mutex<HashMap<(String, String), Option<f32>>>,
}

impl ThresholdCache {
    fn get(&self, predictor: &str, language: &str) -> Option<Option<f32>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&(predictor.to_string(), language.to_string()))
            .copied()
    }

    fn insert(&self, predictor: &str, language: &str, threshold: Option<f32>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((predictor.to_string(), language.to_string()), threshold);
    }
}

// ---------------------------------------------------------------------------
// EvaluationEngine
// ---------------------------------------------------------------------------

/// Produces a [`ComparisonRun`] from registered predictors and samples.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use eot_compare::config::EngineConfig;
/// use eot_compare::eval::{EvaluationEngine, LanguageSample};
/// use eot_compare::predictor::{HeuristicPredictor, PredictorHandle};
///
/// # async fn example() {
/// let mut engine = EvaluationEngine::new(EngineConfig::default());
/// engine.register(PredictorHandle::new("baseline", Arc::new(HeuristicPredictor::new())));
///
/// let samples = vec![LanguageSample::new("en", ["Hello, how are you?"])];
/// let run = engine.run(&samples).await.unwrap();
/// assert_eq!(run.len(), 1);
/// # }
/// ```
pub struct EvaluationEngine {
    config: EngineConfig,
    handles: Vec<PredictorHandle>,
    language_filter: Option<BTreeSet<String>>,
}

impl EvaluationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            handles: Vec::new(),
            language_filter: None,
        }
    }

    /// Register a predictor.  Registration order is report order.
    pub fn register(&mut self, handle: PredictorHandle) -> &mut Self {
        self.handles.push(handle);
        self
    }

    /// Only evaluate samples whose tag is in `tags`.
    pub fn restrict_to_languages<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.language_filter = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Per-call timeout; `None` when `timeout_ms == 0`.
    fn timeout(&self) -> Option<Duration> {
        (self.config.timeout_ms > 0).then(|| Duration::from_millis(self.config.timeout_ms))
    }

    // -----------------------------------------------------------------------
    // Setup validation
    // -----------------------------------------------------------------------

    /// Check the registration against `samples` without measuring anything.
    pub fn validate(&self, samples: &[LanguageSample]) -> Result<(), ConfigurationError> {
        if self.handles.is_empty() {
            return Err(ConfigurationError::NoPredictors);
        }

        let mut names = HashSet::new();
        for handle in &self.handles {
            if !names.insert(handle.name()) {
                return Err(ConfigurationError::DuplicatePredictor(handle.name().to_string()));
            }
            if let LanguageScope::Only(tags) = handle.scope() {
                if tags.is_empty() {
                    return Err(ConfigurationError::EmptyScope(handle.name().to_string()));
                }
                for tag in tags {
                    if !is_known_language(tag) {
                        return Err(ConfigurationError::UnknownLanguage {
                            language: tag.clone(),
                            origin: format!("scope of predictor `{}`", handle.name()),
                        });
                    }
                    if !handle.predictor().supports_language(tag) {
                        return Err(ConfigurationError::UnsupportedLanguage {
                            predictor: handle.name().to_string(),
                            language: tag.clone(),
                        });
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for sample in samples {
            if !is_known_language(sample.tag()) {
                return Err(ConfigurationError::UnknownLanguage {
                    language: sample.tag().to_string(),
                    origin: "sample set".into(),
                });
            }
            if !seen.insert(sample.tag()) {
                return Err(ConfigurationError::DuplicateLanguage(sample.tag().to_string()));
            }
        }

        if let Some(filter) = &self.language_filter {
            for tag in filter {
                if !seen.contains(tag.as_str()) {
                    return Err(ConfigurationError::FilterNotInSamples(tag.clone()));
                }
            }
        }

        // Unscoped predictors are still asked about every sample language.
        for sample in self.selected(samples) {
            for handle in self.handles.iter().filter(|h| h.applies_to(sample.tag())) {
                if !handle.predictor().supports_language(sample.tag()) {
                    return Err(ConfigurationError::UnsupportedLanguage {
                        predictor: handle.name().to_string(),
                        language: sample.tag().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn selected<'a>(&'a self, samples: &'a [LanguageSample]) -> impl Iterator<Item = &'a LanguageSample> + 'a {
        samples.iter().filter(move |s| {
            self.language_filter
                .as_ref()
                .map_or(true, |filter| filter.contains(s.tag()))
        })
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Evaluate every applicable (sample, predictor) pair.
    ///
    /// Fails only on setup problems; per-pair inference failures are recorded
    /// in the returned run.
    pub async fn run(&self, samples: &[LanguageSample]) -> Result<ComparisonRun, ConfigurationError> {
        self.validate(samples)?;

        let selected: Vec<&LanguageSample> = self.selected(samples).collect();

        // (key, handle index) in language → sample → predictor order.
        let mut jobs: Vec<(ResultKey, usize)> = Vec::new();
        for sample in &selected {
            for (idx, utterance) in sample.utterances().iter().enumerate() {
                for (h, handle) in self.handles.iter().enumerate() {
                    if !handle.applies_to(sample.tag()) {
                        continue;
                    }
                    jobs.push((
                        ResultKey {
                            language: sample.tag().to_string(),
                            sample_index: idx + 1,
                            utterance: utterance.clone(),
                            predictor: handle.name().to_string(),
                        },
                        h,
                    ));
                }
            }
        }

        log::info!(
            "eval: {} measurement(s) across {} language(s) with {} predictor(s), concurrency {}",
            jobs.len(),
            selected.len(),
            self.handles.len(),
            self.config.concurrency.max(1)
        );

        let cache = Arc::new(ThresholdCache::default());
        let timeout = self.timeout();

        let results = if self.config.concurrency <= 1 {
            let mut results = Vec::with_capacity(jobs.len());
            for (key, h) in jobs {
                let predictor = Arc::clone(self.handles[h].predictor());
                results.push(measure(predictor, key, timeout, Arc::clone(&cache)).await);
            }
            results
        } else {
            self.run_parallel(jobs, timeout, cache).await
        };

        let languages = selected
            .iter()
            .map(|s| LanguageInfo {
                tag: s.tag().to_string(),
                name: s.name().to_string(),
                sample_count: s.utterances().len(),
            })
            .collect();

        let predictors = self
            .handles
            .iter()
            .map(|h| PredictorInfo {
                name: h.name().to_string(),
                description: h.description().to_string(),
                scope: h.scope().clone(),
            })
            .collect();

        Ok(ComparisonRun::new(languages, predictors, results))
    }

    async fn run_parallel(
        &self,
        jobs: Vec<(ResultKey, usize)>,
        timeout: Option<Duration>,
        cache: Arc<ThresholdCache>,
    ) -> Vec<EvaluationResult> {
        let limit = self
            .config
            .concurrency
            .min(jobs.len())
            .clamp(1, Semaphore::MAX_PERMITS);
        let permits = Arc::new(Semaphore::new(limit));

        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|(key, h)| {
                let predictor = Arc::clone(self.handles[h].predictor());
                let permits = Arc::clone(&permits);
                let cache = Arc::clone(&cache);
                let task_key = key.clone();
                let task = tokio::spawn(async move {
                    // Held for the whole measurement; queueing happens before
                    // the timer starts.
                    let _permit = permits.acquire_owned().await.ok();
                    measure(predictor, task_key, timeout, cache).await
                });
                (key, task)
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for (key, task) in tasks {
            match task.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!("eval: measurement task for `{}` died: {e}", key.predictor);
                    results.push(EvaluationResult::failed(key, format!("measurement task failed: {e}")));
                }
            }
        }
        results
    }
}

// ---------------------------------------------------------------------------
// Single measurement
// ---------------------------------------------------------------------------

async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T, InferenceError>
where
    F: Future<Output = Result<T, InferenceError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(InferenceError::Timeout)),
        None => fut.await,
    }
}

/// Score one utterance with one predictor and derive the decision.
async fn measure(
    predictor: Arc<dyn EotPredictor>,
    key: ResultKey,
    timeout: Option<Duration>,
    cache: Arc<ThresholdCache>,
) -> EvaluationResult {
    let ctx = ChatContext::from_user(key.utterance.clone());

    let start = Instant::now();
    let scored = with_timeout(timeout, predictor.score(&ctx)).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    let probability = match scored.and_then(check_probability) {
        Ok(p) => p,
        Err(e) => {
            log::warn!(
                "eval: `{}` failed on {}#{}: {e}",
                key.predictor,
                key.language,
                key.sample_index
            );
            return EvaluationResult::failed(key, e.to_string());
        }
    };

    let threshold = match cache.get(&key.predictor, &key.language) {
        Some(cached) => Ok(cached),
        None => {
            let looked_up = with_timeout(timeout, predictor.decision_threshold(&key.language))
                .await
                .and_then(|t| t.map(check_probability).transpose());
            if let Ok(t) = looked_up {
                cache.insert(&key.predictor, &key.language, t);
            }
            looked_up
        }
    };

    match threshold {
        Ok(threshold) => {
            log::debug!(
                "eval: `{}` {}#{} p={probability:.4} t={threshold:?} ({latency_ms:.2}ms)",
                key.predictor,
                key.language,
                key.sample_index
            );
            EvaluationResult::scored(key, probability, threshold, latency_ms)
        }
        Err(e) => {
            log::warn!(
                "eval: `{}` threshold lookup for {} failed: {e}",
                key.predictor,
                key.language
            );
            EvaluationResult::threshold_failed(key, probability, latency_ms, e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
